use std::env;

use eyre::{eyre, Result};
use hidraw_leds::{HidrawLeds, Rgb, LEN_MAX};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.init();

	let path = env::args()
		.nth(1)
		.ok_or_else(|| eyre!("usage: blocking <hidraw device>"))?;

	let mut leds = HidrawLeds::open(&path)?;

	let colors: Vec<Rgb> = (0..LEN_MAX)
		.map(|i| {
			let t = (i * 255 / (LEN_MAX - 1)) as u8;
			Rgb::new(t, 0, 255 - t)
		})
		.collect();

	#[allow(clippy::let_unit_value)]
	let result = leds.set_leds(&colors)?;
	info!(?result, leds = colors.len(), "gradient written");

	Ok(())
}
