//! Drive the individually addressable RGB LEDs of a HID device through its `hidraw` node.
//!
//! ```no_run
//! use hidraw_leds::{HidrawLeds, Rgb};
//!
//! let mut leds = HidrawLeds::open("/dev/hidraw0")?;
//! leds.set_leds(&[Rgb::new(255, 0, 128); 90])?;
//! # Ok::<(), hidraw_leds::Error>(())
//! ```

use std::{
	fs::{File, OpenOptions},
	io::{self, Write},
	path::{Path, PathBuf},
};
#[cfg(feature = "timings")]
use std::time::{Duration, Instant};

pub use hidraw_leds_shared::{FRAMED_REPORT_LENGTH, LEN_MAX, REPORT_LENGTH};
use tracing::{info, trace};

mod report;
#[cfg(feature = "tokio")]
pub mod tokio;

pub use report::{encode, frame, Color, FramedReport, Report, Rgb};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("too many elements: {len} (expected at most {})", LEN_MAX)]
	TooManyElements { len: usize },
	#[error("intensity component value out of range ([0, 255]) in element {index}")]
	ComponentOutOfRange { index: usize },
	#[error("opening device \"{}\"", .path.display())]
	Open {
		path:   PathBuf,
		#[source]
		source: io::Error,
	},
	#[error(transparent)]
	Io(#[from] io::Error),
}

impl Error {
	/// Whether the colors passed in were rejected, as opposed to the device failing.
	pub fn is_invalid_input(&self) -> bool {
		matches!(
			self,
			Error::TooManyElements { .. } | Error::ComponentOutOfRange { .. }
		)
	}
}

impl From<Error> for io::Error {
	fn from(err: Error) -> Self {
		let kind = match &err {
			Error::Open { source, .. } | Error::Io(source) => source.kind(),
			_ => io::ErrorKind::InvalidInput,
		};

		match err {
			Error::Io(err) => err,
			err => io::Error::new(kind, err),
		}
	}
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(feature = "timings")]
pub type WriteResult = Duration;
#[cfg(not(feature = "timings"))]
pub type WriteResult = ();

/// Writes a framed report to the device in a single `write` call.
///
/// Errors from the sink are returned as is and nothing is retried. A short write fails with
/// [`io::ErrorKind::WriteZero`]. The sink is not flushed.
///
/// Reports written concurrently to the same device may interleave, callers sharing a handle have
/// to serialize access themselves.
pub fn send<W: Write + ?Sized>(sink: &mut W, report: &FramedReport) -> io::Result<WriteResult> {
	#[cfg(feature = "timings")]
	let start = Instant::now();

	let written = sink.write(report.as_bytes())?;
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
/// Holds no state besides the sink. Sharing one device between several instances works, but
/// the order in which their reports arrive is up to the caller.
#[derive(Debug)]
pub struct HidrawLeds<W = File> {
	sink: W,
}

impl HidrawLeds<File> {
	/// Opens the `hidraw` node at `path` for writing.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let sink = OpenOptions::new()
			.write(true)
			.open(path)
			.map_err(|source| Error::Open {
				path: path.to_path_buf(),
				source,
			})?;

		info!(path = %path.display(), "opened device");

		Ok(Self::new(sink))
	}
}

impl<W: Write> HidrawLeds<W> {
	/// Wraps an already open device.
	pub fn new(sink: W) -> Self {
		Self { sink }
	}

	/// Sets LED `i` to `colors[i]` and turns off every LED after the last color.
	pub fn set_leds<T: Color>(&mut self, colors: &[T]) -> Result<WriteResult> {
		let report = encode(colors)?;
		Ok(send(&mut self.sink, &report.frame())?)
	}

	pub fn turn_off(&mut self) -> Result<WriteResult> {
		self.set_leds::<Rgb>(&[])
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

#[cfg(test)]
mod tests {
	use std::{fs, io::Cursor};

	use super::*;

	struct FailingWriter {
		kind:   io::ErrorKind,
		writes: usize,
	}

	impl Write for FailingWriter {
		fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
			self.writes += 1;
			Err(io::Error::new(self.kind, "device gone"))
		}

		fn flush(&mut self) -> io::Result<()> {
			Ok(())
		}
	}

	struct ShortWriter;

	impl Write for ShortWriter {
		fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
			Ok(buf.len() - 1)
		}

		fn flush(&mut self) -> io::Result<()> {
			Ok(())
		}
	}

	#[derive(Default)]
	struct RecordingWriter {
		writes:  Vec<Vec<u8>>,
		flushes: usize,
	}

	impl Write for RecordingWriter {
		fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
			self.writes.push(buf.to_vec());
			Ok(buf.len())
		}

		fn flush(&mut self) -> io::Result<()> {
			self.flushes += 1;
			Ok(())
		}
	}

	#[test]
	fn send_writes_framed_report_once() {
		let framed = encode(&[(255, 0, 128)]).unwrap().frame();
		let mut sink = RecordingWriter::default();

		send(&mut sink, &framed).unwrap();

		assert_eq!(sink.writes.len(), 1);
		assert_eq!(sink.writes[0], framed.as_bytes().to_vec());
		assert_eq!(sink.writes[0].len(), 374);
		assert_eq!(&sink.writes[0][..6], &[0x2A, 0x0C, 0x02, 0x00, 0x01, 0x0F]);
		assert_eq!(&sink.writes[0][14..17], &[0xFF, 0x00, 0x80]);
		assert_eq!(sink.flushes, 0);
	}

	#[test]
	fn send_propagates_sink_error_without_retry() {
		let framed = encode::<Rgb>(&[]).unwrap().frame();
		let mut sink = FailingWriter {
			kind:   io::ErrorKind::BrokenPipe,
			writes: 0,
		};

		let err = send(&mut sink, &framed).unwrap_err();

		assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
		assert_eq!(err.to_string(), "device gone");
		assert_eq!(sink.writes, 1);
	}

	#[test]
	fn send_rejects_short_write() {
		let framed = encode::<Rgb>(&[]).unwrap().frame();

		let err = send(&mut ShortWriter, &framed).unwrap_err();

		assert_eq!(err.kind(), io::ErrorKind::WriteZero);
	}

	#[test]
	fn send_into_full_buffer_fails() {
		let framed = encode::<Rgb>(&[]).unwrap().frame();
		let mut buffer = [0u8; 100];
		let mut sink = Cursor::new(&mut buffer[..]);

		let err = send(&mut sink, &framed).unwrap_err();

		assert_eq!(err.kind(), io::ErrorKind::WriteZero);
	}

	#[test]
	fn set_leds_writes_report() {
		let mut leds = HidrawLeds::new(Vec::new());

		leds.set_leds(&[Rgb::new(1, 2, 3), Rgb::new(4, 5, 6)]).unwrap();

		let written = leds.into_inner();
		assert_eq!(written.len(), FRAMED_REPORT_LENGTH);
		assert_eq!(written[0], 0x2A);
		assert_eq!(written[4], 2);
		assert_eq!(&written[14..20], &[1, 2, 3, 4, 5, 6]);
		assert!(written[20..].iter().all(|&b| b == 0));
	}

	#[test]
	fn set_leds_writes_nothing_on_invalid_input() {
		let mut leds = HidrawLeds::new(Vec::new());

		let err = leds.set_leds(&[(0, 0, 0), (0, 0, 256)]).unwrap_err();
		assert!(matches!(err, Error::ComponentOutOfRange { index: 1 }));

		let err = leds.set_leds(&[Rgb::OFF; LEN_MAX + 1]).unwrap_err();
		assert!(matches!(err, Error::TooManyElements { len: 91 }));

		assert!(leds.get_ref().is_empty());
	}

	#[test]
	fn set_leds_wraps_io_error() {
		let mut leds = HidrawLeds::new(FailingWriter {
			kind:   io::ErrorKind::NotConnected,
			writes: 0,
		});

		let err = leds.turn_off().unwrap_err();

		assert!(!err.is_invalid_input());
		match err {
			Error::Io(err) => assert_eq!(err.kind(), io::ErrorKind::NotConnected),
			err => panic!("unexpected error: {err}"),
		}
		assert_eq!(leds.get_mut().writes, 1);
	}

	#[test]
	fn turn_off_sends_empty_report() {
		let mut leds = HidrawLeds::new(Vec::new());

		leds.turn_off().unwrap();

		let mut expected = vec![0x2A, 0x0C, 0x02, 0x00, 0x00, 0x0F];
		expected.resize(FRAMED_REPORT_LENGTH, 0);
		assert_eq!(leds.into_inner(), expected);
	}

	#[test]
	fn open_reports_path() {
		let err = HidrawLeds::open("/nonexistent/hidraw0").unwrap_err();

		match &err {
			Error::Open { path, source } => {
				assert_eq!(path, Path::new("/nonexistent/hidraw0"));
				assert_eq!(source.kind(), io::ErrorKind::NotFound);
			}
			err => panic!("unexpected error: {err}"),
		}
		assert_eq!(err.to_string(), "opening device \"/nonexistent/hidraw0\"");
		assert_eq!(io::Error::from(err).kind(), io::ErrorKind::NotFound);
	}

	#[test]
	fn open_writes_to_file() {
		let path = std::env::temp_dir().join(format!("hidraw-leds-{}", std::process::id()));
		fs::write(&path, b"").unwrap();

		let mut leds = HidrawLeds::open(&path).unwrap();
		leds.set_leds(&[[9u8, 8, 7]]).unwrap();
		drop(leds);

		let written = fs::read(&path).unwrap();
		fs::remove_file(&path).unwrap();
		assert_eq!(written.len(), FRAMED_REPORT_LENGTH);
		assert_eq!(&written[14..17], &[9, 8, 7]);
	}

	#[cfg(target_os = "linux")]
	#[test]
	fn set_leds_reports_device_error() {
		let mut leds = HidrawLeds::open("/dev/full").unwrap();

		let err = leds.set_leds(&[(1, 2, 3)]).unwrap_err();

		assert!(matches!(&err, Error::Io(err) if err.raw_os_error() == Some(28)));
	}

	#[cfg(feature = "timings")]
	#[test]
	fn send_reports_write_duration() {
		use std::time::Duration;

		let framed = encode(&[Rgb::new(1, 2, 3)]).unwrap().frame();
		let mut sink = RecordingWriter::default();

		let elapsed: Duration = send(&mut sink, &framed).unwrap();

		assert!(elapsed < Duration::from_secs(1));
		assert_eq!(sink.writes.len(), 1);

		let mut leds = HidrawLeds::new(Vec::new());
		let elapsed: Duration = leds.turn_off().unwrap();
		assert!(elapsed < Duration::from_secs(1));
	}

	#[test]
	fn invalid_input_maps_to_io_kind() {
		let err = io::Error::from(Error::TooManyElements { len: 91 });
		assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
		assert_eq!(
			err.to_string(),
			"too many elements: 91 (expected at most 90)"
		);

		let err = io::Error::from(Error::Io(io::ErrorKind::TimedOut.into()));
		assert_eq!(err.kind(), io::ErrorKind::TimedOut);
	}
}
