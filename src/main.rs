//! Vitrine checkout driver
//!
//! Loads a fixture set, prices its cart and prints the receipt.
//!
//! Use `-f` to load a fixture set by name
//! Use `-c` to apply a coupon code
//! Use `--at` to price at a point in time other than now

use std::{io, io::Write, time::Instant};

use anyhow::{Result, bail};
use humanize_duration::{Truncate, prelude::DurationExt};
use jiff::Timestamp;

use vitrine::{
    checkout::{CheckoutError, checkout},
    config::Config,
    coupons::ValidationResponse,
    fixtures::Fixture,
    observability::init_subscriber,
};

fn main() -> Result<()> {
    let config = Config::load()?;

    init_subscriber(&config.logging)?;

    let fixture = Fixture::load(&config.fixtures_dir, &config.fixture)?;
    let context = config.checkout_context(Timestamp::now());

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let start = Instant::now();

    let receipt = match checkout(
        fixture.storefront(),
        fixture.cart(),
        fixture.redemptions(),
        &context,
    ) {
        Ok(receipt) => receipt,
        Err(CheckoutError::Coupon(error)) => {
            let response = ValidationResponse::from_result(&Err(error));

            writeln!(handle, "{}", serde_json::to_string_pretty(&response)?)?;

            bail!("coupon rejected");
        }
        Err(error) => return Err(error.into()),
    };

    let elapsed = start.elapsed();

    writeln!(
        handle,
        "\n {} ({}) at {}",
        fixture.storefront().tenant().name,
        context.customer_type,
        context.now
    )?;

    receipt.write_to(&mut handle)?;

    writeln!(
        handle,
        " {} ({}s)",
        elapsed.human(Truncate::Nano),
        elapsed.as_secs_f32()
    )?;

    Ok(())
}
