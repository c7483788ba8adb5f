use colored::Colorize;

use crate::food::pipeline::ResolutionPipeline;
use crate::llm::chat::CHAT_UNAVAILABLE;
use crate::llm::{ChatAssistant, SectionGateway};
use crate::profile::UserProfile;
use crate::session::Session;

mod profile_cmd;
mod scan_cmd;
mod system;

pub use system::print_help;

/// Whether the REPL should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Interactive front end over one in-process session.
pub struct CommandHandler {
    pipeline: ResolutionPipeline,
    sections: SectionGateway,
    chat: ChatAssistant,
    session: Session,
}

impl CommandHandler {
    pub fn new(
        pipeline: ResolutionPipeline,
        sections: SectionGateway,
        chat: ChatAssistant,
        profile: UserProfile,
    ) -> Self {
        Self {
            pipeline,
            sections,
            chat,
            session: Session::new(profile),
        }
    }

    pub async fn handle_command(&mut self, input: &str) -> Result<Flow, String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Flow::Continue);
        }

        let (command, args) = input
            .split_once(char::is_whitespace)
            .unwrap_or((input, ""));

        match command.to_lowercase().as_str() {
            "help" => system::print_help(),
            "exit" | "quit" => {
                system::print_goodbye();
                return Ok(Flow::Exit);
            }
            "profile" => {
                profile_cmd::handle_command(args, &mut self.session.profile)?;
            }
            "scan" => scan_cmd::handle_scan(args, &self.pipeline, &mut self.session).await?,
            "product" => self.show_product().await?,
            "ask" => self.ask(args).await?,
            // Default to chat if no command matches
            _ => self.ask(input).await?,
        }
        Ok(Flow::Continue)
    }

    async fn show_product(&self) -> Result<(), String> {
        let record = self
            .session
            .record
            .as_ref()
            .ok_or_else(|| "Nothing scanned yet. Try: scan food <image>".to_string())?;

        scan_cmd::print_record(record);
        println!("{}", "⏳ Generating analysis...".dimmed());
        let sections = self
            .sections
            .synthesize_sections(&self.session.profile, record)
            .await;
        scan_cmd::print_sections(&sections);
        Ok(())
    }

    async fn ask(&self, question: &str) -> Result<(), String> {
        if question.trim().is_empty() {
            return Err("Please provide a question. Usage: ask <question>".to_string());
        }

        let answer = self
            .chat
            .answer(&self.session.profile, self.session.record.as_ref(), question)
            .await
            .unwrap_or_else(|| CHAT_UNAVAILABLE.to_string());
        println!("{}\n", answer.truecolor(255, 236, 179));
        Ok(())
    }
}
