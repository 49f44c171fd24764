use std::env;

use eyre::{eyre, Result};
use hidraw_leds::{tokio::HidrawLeds, Rgb, LEN_MAX};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.init();

	let path = env::args()
		.nth(1)
		.ok_or_else(|| eyre!("usage: tokio <hidraw device>"))?;

	let mut leds = HidrawLeds::open(&path).await?;

	// every third LED white, the rest off
	let colors: Vec<Rgb> = (0..LEN_MAX)
		.map(|i| if i % 3 == 0 { Rgb::new(255, 255, 255) } else { Rgb::OFF })
		.collect();

	#[allow(clippy::let_unit_value)]
	let result = leds.set_leds(&colors).await?;
	info!(?result, leds = colors.len(), "pattern written");

	Ok(())
}
