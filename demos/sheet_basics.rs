//! Basic example: base values, formulas, and reads
//!
//! This example demonstrates:
//! - Setting plain base values
//! - Binding a formula to a name
//! - Reading values with formulas evaluated transparently

use charsheet::{CharacterSheet, GameContext, SyntaxError};

fn main() -> Result<(), SyntaxError> {
    let mut sheet = CharacterSheet::new();
    let context = GameContext::new();

    // Plain numbers first
    println!("Setting base values:");
    sheet.set_value("Creo Exp", 7.0, &context).ok();
    println!("  - Creo Exp: 7");

    sheet.set_value("Intelligence", 2.0, &context).ok();
    println!("  - Intelligence: 2");

    // An art score derived from its experience total
    println!("\nBinding a formula:");
    let formula = "RoundDown((sqrt(8 * [Creo Exp] + 1) - 1) / 2)";
    sheet.set_expression("Creo", formula, &context)?;
    println!("  Creo = {formula}");

    if let Some(expression) = sheet.expression("creo") {
        println!("\nParsed tree:\n{}", expression.pretty_tree());
    }

    // Reads evaluate the formula against the current state
    println!("Current values:");
    for name in ["creo exp", "intelligence", "creo"] {
        if let Ok(Some(value)) = sheet.get_value(name, &context) {
            println!("  {name}: {value}");
        }
    }

    Ok(())
}
