//! Cycle detection example: circular formulas are rejected transactionally
//!
//! This example demonstrates:
//! - An assignment that would close a dependency loop failing cleanly
//! - The error reporting the offending path
//! - The store remaining usable afterwards

use charsheet::{CharacterSheet, GameContext, SyntaxError};

fn main() {
    let mut sheet = CharacterSheet::new();
    let context = GameContext::new();

    println!("Defining: Creo = [Creo Exp] * 2");
    sheet
        .set_expression("Creo", "[Creo Exp] * 2", &context)
        .expect("no cycle yet");

    println!("Defining: Creo Exp = [Creo] * 2 (closes a loop)");
    match sheet.set_expression("Creo Exp", "[Creo] * 2", &context) {
        Err(SyntaxError::CyclicDependency { path }) => {
            let rendered: Vec<&str> = path.iter().map(|id| id.as_str()).collect();
            println!("  rejected: {}", rendered.join(" -> "));
        }
        other => println!("  unexpected outcome: {other:?}"),
    }

    // the rejection left no trace; the name still takes a plain number
    println!("\nAssigning Creo Exp = 7 instead");
    sheet.set_value("Creo Exp", 7.0, &context).ok();
    println!(
        "  Creo Exp: {:?}, Creo: {:?}",
        sheet.get_value("creo exp", &context).ok().flatten(),
        sheet.get_value("creo", &context).ok().flatten()
    );
}
