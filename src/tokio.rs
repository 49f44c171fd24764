#[cfg(feature = "timings")]
use std::time::Instant;
use std::{io, path::Path};

use hidraw_leds_shared::FRAMED_REPORT_LENGTH;
use tokio::{
	fs::{File, OpenOptions},
	io::{AsyncWrite, AsyncWriteExt},
};
use tracing::{info, trace};

use crate::{encode, Color, Error, FramedReport, Result, Rgb, WriteResult};

/// Writes a framed report with a single `write` call on the sink.
///
/// Same contract as the blocking [`crate::send`]. The sink is not flushed, so with a buffering
/// sink such as [`tokio::fs::File`] a successful return only means the bytes were accepted, and
/// a failed write shows up on the next write or flush.
pub async fn send<W>(sink: &mut W, report: &FramedReport) -> io::Result<WriteResult>
where
	W: AsyncWrite + Unpin + ?Sized,
{
	#[cfg(feature = "timings")]
	let start = Instant::now();

	let written = sink.write(report.as_bytes()).await?;
	if written != FRAMED_REPORT_LENGTH {
		return Err(io::Error::new(
			io::ErrorKind::WriteZero,
			format!("incomplete report write: {written} of {FRAMED_REPORT_LENGTH} bytes"),
		));
	}

	trace!(leds = report.led_count(), bytes = written, "sent report");

	#[cfg(feature = "timings")]
	return Ok(start.elapsed());

	#[cfg(not(feature = "timings"))]
	Ok(())
}

/// An open device accepting LED reports.
///
/// [`HidrawLeds::set_leds`] flushes after every report, so a device error is returned from the
/// call that caused it.
#[derive(Debug)]
pub struct HidrawLeds<W = File> {
	sink: W,
}

impl HidrawLeds<File> {
	/// Opens the `hidraw` node at `path` for writing.
	pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let sink = OpenOptions::new()
			.write(true)
			.open(path)
			.await
			.map_err(|source| Error::Open {
				path: path.to_path_buf(),
				source,
			})?;

		info!(path = %path.display(), "opened device");

		Ok(Self::new(sink))
	}
}

impl<W: AsyncWrite + Unpin> HidrawLeds<W> {
	pub fn new(sink: W) -> Self {
		Self { sink }
	}

	/// Sets LED `i` to `colors[i]` and turns off every LED after the last color.
	pub async fn set_leds<T: Color>(&mut self, colors: &[T]) -> Result<WriteResult> {
		let report = encode(colors)?.frame();
		let result = send(&mut self.sink, &report).await?;
		self.sink.flush().await?;
		Ok(result)
	}

	pub async fn turn_off(&mut self) -> Result<WriteResult> {
		self.set_leds::<Rgb>(&[]).await
	}

	pub fn get_ref(&self) -> &W {
		&self.sink
	}

	pub fn get_mut(&mut self) -> &mut W {
		&mut self.sink
	}

	pub fn into_inner(self) -> W {
		self.sink
	}
}
