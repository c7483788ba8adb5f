use colored::Colorize;
use std::path::Path;

use crate::food::pipeline::{Resolution, ResolutionPipeline};
use crate::food::record::NutritionRecord;
use crate::llm::Sections;
use crate::session::Session;

/// `scan <barcode|food> <path>`: resolve an image file into the session.
pub async fn handle_scan(
    args: &str,
    pipeline: &ResolutionPipeline,
    session: &mut Session,
) -> Result<(), String> {
    let (mode, path) = args
        .trim()
        .split_once(char::is_whitespace)
        .ok_or_else(|| "Usage: scan <barcode|food> <image path>".to_string())?;
    let path = path.trim().trim_matches('"');

    let image = tokio::fs::read(Path::new(path))
        .await
        .map_err(|e| format!("Could not read {}: {}", path, e))?;

    println!("🔍 Scanning {} in {} mode...", path.cyan(), mode.cyan());
    match pipeline.resolve(mode, &image).await {
        Resolution::Resolved(record) => {
            print_record(&record);
            session.record_scan(record, image);
            Ok(())
        }
        Resolution::Failed(reason) => Err(format!("[{}] {}", reason.code(), reason)),
    }
}

pub fn print_record(record: &NutritionRecord) {
    println!("\n🍽️  {}", record.product_name.bold());
    println!("  {}", record.description);

    let rows = [
        ("Calories", Some(&record.calories)),
        ("Quantity", record.quantity.as_ref()),
        ("Protein", record.protein.as_ref()),
        ("Carbs", record.carbs.as_ref()),
        ("Fat", record.fat.as_ref()),
        ("Fiber", record.fiber.as_ref()),
        ("Sugar", record.sugar.as_ref()),
        ("Sodium", record.sodium.as_ref()),
        ("Allergens", Some(&record.allergens)),
        ("Ingredients", Some(&record.important_ingredients)),
        ("Expires", Some(&record.expiration_date)),
        ("Source", record.source.as_ref()),
    ];
    for (label, value) in rows {
        if let Some(value) = value {
            println!("  {:<12} {}", format!("{}:", label).dimmed(), value);
        }
    }
    println!("  {:<12} {}", "Dietary:".dimmed(), record.dietary.to_string().green());

    if let Some(note) = &record.note {
        println!("\n  ⚠️  {}", note.yellow());
    }
    println!();
}

pub fn print_sections(sections: &Sections) {
    let blocks = [
        ("🧠 Summary", sections.summary.as_deref()),
        ("🔁 Alternatives", sections.alternatives.as_deref()),
        ("🧾 Ingredients", Some(sections.ingredients.as_str())),
        ("⚠️ Allergens", Some(sections.allergens.as_str())),
        ("🔥 Calories", Some(sections.calories.as_str())),
    ];
    for (title, body) in blocks {
        println!("{}", title.bold());
        match body {
            Some(body) => println!("{}\n", body.truecolor(255, 236, 179)),
            None => println!("{}\n", "Not available right now.".dimmed()),
        }
    }
}
