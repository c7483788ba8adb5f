use colored::Colorize;

pub fn print_help() {
    println!("\n🥗 KenShoku Commands:");
    println!("  Just type a question to chat about your scanned food");
    println!();

    println!("👤 Profile Commands:");
    println!("  profile                    - Show the current profile");
    println!("  profile key=value ...      - Set profile fields");
    println!("  Example: profile name=Sam age=34 goals=\"lose weight\" allergens=peanuts");
    println!();

    println!("📷 Scan Commands:");
    println!("  scan barcode <image>  - Look up a packaged product by its barcode");
    println!("  scan food <image>     - Identify a fresh food from a photo");
    println!();

    println!("📋 Product Commands:");
    println!("  product       - Personalized analysis of the last scan");
    println!("  ask <question> - Ask about the last scan");
    println!();

    println!("⚙️ System Commands:");
    println!("  help  - Show this help menu");
    println!("  exit  - Exit the program");
    println!();
}

pub fn print_goodbye() {
    println!("{}", "👋 Goodbye!".green());
}
