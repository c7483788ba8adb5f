use colored::Colorize;

use crate::profile::UserProfile;

/// Split `key=value` pairs, allowing double-quoted values with spaces.
pub fn parse_assignments(input: &str) -> Result<Vec<(String, String)>, String> {
    let mut pairs = Vec::new();
    let mut chars = input.trim().chars().peekable();

    while chars.peek().is_some() {
        while chars.peek().map_or(false, |c| c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let key: String = chars.by_ref().take_while(|c| *c != '=').collect();
        let key = key.trim().to_lowercase();
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(format!("Expected key=value, got '{}'", key));
        }

        let value: String = if chars.peek() == Some(&'"') {
            chars.next();
            let quoted: String = chars.by_ref().take_while(|c| *c != '"').collect();
            quoted
        } else {
            chars.by_ref().take_while(|c| !c.is_whitespace()).collect()
        };
        pairs.push((key, value.trim().to_string()));
    }

    Ok(pairs)
}

pub fn handle_command(args: &str, profile: &mut UserProfile) -> Result<(), String> {
    if args.trim().is_empty() {
        print_profile(profile);
        return Ok(());
    }

    for (key, value) in parse_assignments(args)? {
        profile.set(key, value);
    }
    println!("{}", "✅ Profile updated".green());
    print_profile(profile);
    Ok(())
}

fn print_profile(profile: &UserProfile) {
    if profile.is_blank() {
        println!("No profile set. Example: profile name=Sam goals=\"more protein\"");
        return;
    }
    for (key, value) in profile.fields() {
        println!("  {:<10} {}", format!("{}:", key).dimmed(), value);
    }
}
