use std::ops::Deref;

use hidraw_leds_shared::{
	BYTES_PER_LED,
	FRAMED_REPORT_LENGTH,
	LED_COUNT_OFFSET,
	LEN_MAX,
	MAGIC_SEQUENCE,
	REPORT_LENGTH,
	REPORT_TYPE,
	REPORT_TYPE_LEN,
	RGB_DATA_OFFSET,
	STRIP_INDEX,
	STRIP_INDEX_OFFSET,
};

use crate::{Error, Result};

/// A single LED color with 8 bit intensity per channel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
	pub r: u8,
	pub g: u8,
	pub b: u8,
}

impl Rgb {
	pub const OFF: Rgb = Rgb::new(0, 0, 0);

	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b }
	}
}

impl From<(u8, u8, u8)> for Rgb {
	fn from((r, g, b): (u8, u8, u8)) -> Self {
		Self::new(r, g, b)
	}
}

impl From<[u8; 3]> for Rgb {
	fn from([r, g, b]: [u8; 3]) -> Self {
		Self::new(r, g, b)
	}
}

/// Anything that can be packed into the report as an `(r, g, b)` triple.
///
/// Implemented for [`Rgb`], and for tuples and arrays of any integer type, in which case every
/// component is range checked against `0..=255` instead of being truncated.
pub trait Color {
	/// Returns `None` if any component does not fit in a `u8`.
	fn components(&self) -> Option<[u8; BYTES_PER_LED]>;
}

impl Color for Rgb {
	fn components(&self) -> Option<[u8; BYTES_PER_LED]> {
		Some([self.r, self.g, self.b])
	}
}

impl<C> Color for (C, C, C)
where
	C: Copy + TryInto<u8>,
{
	fn components(&self) -> Option<[u8; BYTES_PER_LED]> {
		let (r, g, b) = *self;
		Some([r.try_into().ok()?, g.try_into().ok()?, b.try_into().ok()?])
	}
}

impl<C> Color for [C; 3]
where
	C: Copy + TryInto<u8>,
{
	fn components(&self) -> Option<[u8; BYTES_PER_LED]> {
		let [r, g, b] = *self;
		Some([r.try_into().ok()?, g.try_into().ok()?, b.try_into().ok()?])
	}
}

impl<T: Color + ?Sized> Color for &T {
	fn components(&self) -> Option<[u8; BYTES_PER_LED]> {
		(**self).components()
	}
}

/// An output report addressing every LED individually, without the leading report type byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report([u8; REPORT_LENGTH]);

impl Report {
	pub fn as_bytes(&self) -> &[u8; REPORT_LENGTH] {
		&self.0
	}

	pub fn into_inner(self) -> [u8; REPORT_LENGTH] {
		self.0
	}

	/// Number of LEDs the report carries colors for, the rest are off.
	pub fn led_count(&self) -> usize {
		self.0[LED_COUNT_OFFSET] as usize
	}

	pub fn frame(&self) -> FramedReport {
		frame(self)
	}
}

impl Deref for Report {
	type Target = [u8];

	fn deref(&self) -> &[u8] {
		&self.0
	}
}

impl AsRef<[u8]> for Report {
	fn as_ref(&self) -> &[u8] {
		&self.0
	}
}

/// A [`Report`] prefixed with its report type, ready to be written to the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedReport([u8; FRAMED_REPORT_LENGTH]);

impl FramedReport {
	pub fn as_bytes(&self) -> &[u8; FRAMED_REPORT_LENGTH] {
		&self.0
	}

	pub fn into_inner(self) -> [u8; FRAMED_REPORT_LENGTH] {
		self.0
	}

	pub fn led_count(&self) -> usize {
		self.0[REPORT_TYPE_LEN + LED_COUNT_OFFSET] as usize
	}
}

impl Deref for FramedReport {
	type Target = [u8];

	fn deref(&self) -> &[u8] {
		&self.0
	}
}

impl AsRef<[u8]> for FramedReport {
	fn as_ref(&self) -> &[u8] {
		&self.0
	}
}

/// Builds a report setting LED `i` to `colors[i]`. LEDs past the end of `colors` are turned off.
///
/// Accepts at most [`LEN_MAX`] colors. Nothing is returned unless every color was packed.
pub fn encode<T: Color>(colors: &[T]) -> Result<Report> {
	if colors.len() > LEN_MAX {
		return Err(Error::TooManyElements { len: colors.len() });
	}

	let mut buffer = [0u8; REPORT_LENGTH];
	buffer[..MAGIC_SEQUENCE.len()].copy_from_slice(MAGIC_SEQUENCE);
	buffer[LED_COUNT_OFFSET] = colors.len() as u8;
	buffer[STRIP_INDEX_OFFSET] = STRIP_INDEX;

	let data = &mut buffer[RGB_DATA_OFFSET..RGB_DATA_OFFSET + colors.len() * BYTES_PER_LED];
	for (index, (color, led)) in colors
		.iter()
		.zip(data.chunks_exact_mut(BYTES_PER_LED))
		.enumerate()
	{
		let components = color
			.components()
			.ok_or(Error::ComponentOutOfRange { index })?;
		led.copy_from_slice(&components);
	}

	Ok(Report(buffer))
}

/// Prepends the report type byte.
pub fn frame(report: &Report) -> FramedReport {
	let mut buffer = [0u8; FRAMED_REPORT_LENGTH];
	buffer[..REPORT_TYPE_LEN].copy_from_slice(&[REPORT_TYPE]);
	buffer[REPORT_TYPE_LEN..].copy_from_slice(&report.0);
	FramedReport(buffer)
}
