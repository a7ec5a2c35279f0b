//! Reactive example: cascading updates and change callbacks
//!
//! This example demonstrates:
//! - Derived values refreshing when their inputs change
//! - Chains of dependent formulas
//! - Change callbacks as the UI notification side-channel

use charsheet::{CharacterSheet, GameContext, SyntaxError};

fn main() -> Result<(), SyntaxError> {
    let mut sheet = CharacterSheet::new();
    let mut context = GameContext::new();
    context.set("Aura", 3.0);

    sheet.set_value("Creo Exp", 10.0, &context).ok();
    sheet.set_value("Intelligence", 2.0, &context).ok();
    sheet.set_expression(
        "Creo",
        "RoundDown((sqrt(8 * [Creo Exp] + 1) - 1) / 2)",
        &context,
    )?;
    sheet.set_expression("Lab Total", "[Creo] + [Intelligence] + [Aura]", &context)?;

    // the UI would repaint from callbacks like these
    sheet.on_value_change("creo", |value| println!("  -> Creo is now {value}"));
    sheet.on_value_change("lab total", |value| println!("  -> Lab Total is now {value}"));

    println!("Starting values:");
    println!(
        "  Creo: {:?}, Lab Total: {:?}",
        sheet.get_value("creo", &context).ok().flatten(),
        sheet.get_value("lab total", &context).ok().flatten()
    );

    println!("\nA season of study: Creo Exp 10 -> 15");
    sheet.set_value("Creo Exp", 15.0, &context).ok();

    println!("\nAnother season: Creo Exp 15 -> 21");
    sheet.set_value("Creo Exp", 21.0, &context).ok();

    println!("\nFinal values:");
    println!(
        "  Creo: {:?}, Lab Total: {:?}",
        sheet.get_value("creo", &context).ok().flatten(),
        sheet.get_value("lab total", &context).ok().flatten()
    );

    Ok(())
}
