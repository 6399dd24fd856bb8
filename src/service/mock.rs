use std::fs::File;

use rand::Rng;

/// Generate a mock operations CSV exercising the full lifecycle: submits,
/// review transitions and notes, in a plausible mix of outcomes.
pub fn generator(output: &str, count: usize) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(output)?;
    let mut wtr = csv::Writer::from_writer(file);
    wtr.write_record([
        "op", "actor", "owner", "amount", "currency", "network", "address", "target",
        "reference", "reason", "note",
    ])?;

    let currencies = ["USDT", "BTC", "ETH"];
    let networks = ["TRC20", "BTC", "ERC20"];

    let mut rng = rand::rng();
    let num_owners = count.max(1);

    for i in 1..=num_owners {
        let owner = format!("user-{}", i);
        let rail = rng.random_range(0..currencies.len());
        let amount = 10.0 + rng.random_range(0.0..490.0);
        let address = format!("0x{:040x}", rng.random_range(0u64..u64::MAX) as u128);

        write_row(&mut wtr, Row {
            op: "submit",
            actor: "",
            owner: &owner,
            amount: Some(amount),
            currency: currencies[rail],
            network: networks[rail],
            address: &address,
            target: "",
            reference: "",
            reason: "",
            note: "",
        })?;

        // Most withdrawals get picked up for processing.
        let processed = rng.random_range(0..10) < 8;
        if processed {
            write_row(&mut wtr, Row {
                op: "transition",
                actor: "ops-admin",
                owner: &owner,
                amount: None,
                currency: "",
                network: "",
                address: "",
                target: "processing",
                reference: "",
                reason: "",
                note: "",
            })?;
        }

        if i % 5 == 0 {
            write_row(&mut wtr, Row {
                op: "note",
                actor: "ops-admin",
                owner: &owner,
                amount: None,
                currency: "",
                network: "",
                address: "",
                target: "",
                reference: "",
                reason: "",
                note: "double-checked destination address",
            })?;
        }

        match rng.random_range(0..10) {
            0..=6 => write_row(&mut wtr, Row {
                op: "transition",
                actor: "ops-admin",
                owner: &owner,
                amount: None,
                currency: "",
                network: "",
                address: "",
                target: "completed",
                reference: &format!("0x{:016x}", rng.random_range(0u64..u64::MAX)),
                reason: "",
                note: "",
            })?,
            7..=8 => write_row(&mut wtr, Row {
                op: "transition",
                actor: "ops-admin",
                owner: &owner,
                amount: None,
                currency: "",
                network: "",
                address: "",
                target: "failed",
                reference: "",
                reason: "destination address rejected by rail",
                note: "",
            })?,
            _ => {} // left pending/processing
        }
    }

    wtr.flush()?;
    println!(
        "Generated lifecycle operations for {} owners to {}",
        num_owners, output
    );
    Ok(())
}

struct Row<'a> {
    op: &'a str,
    actor: &'a str,
    owner: &'a str,
    amount: Option<f64>,
    currency: &'a str,
    network: &'a str,
    address: &'a str,
    target: &'a str,
    reference: &'a str,
    reason: &'a str,
    note: &'a str,
}

fn write_row<W: std::io::Write>(
    wtr: &mut csv::Writer<W>,
    row: Row<'_>,
) -> Result<(), Box<dyn std::error::Error>> {
    let amount = row.amount.map(|a| format!("{:.4}", a)).unwrap_or_default();
    wtr.write_record([
        row.op,
        row.actor,
        row.owner,
        &amount,
        row.currency,
        row.network,
        row.address,
        row.target,
        row.reference,
        row.reason,
        row.note,
    ])?;
    Ok(())
}
