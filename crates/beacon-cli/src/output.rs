//! Output formatting for beacon-cli (text, csv)

use std::net::SocketAddr;

use beacon_core::{BroadcastRecord, Reply, Request};
use clap::ValueEnum;
use colored::Colorize;

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines (default)
    #[default]
    Text,
    /// CSV rows
    Csv,
}

/// Context for output rendering
pub struct OutputContext {
    pub format: OutputFormat,
    pub quiet: bool,
    /// Append the reply record as hex
    pub raw: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat, no_color: bool, quiet: bool, raw: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format, quiet, raw }
    }

    /// Print an info message (unless in quiet mode)
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg);
        }
    }

    /// Print a warning message
    pub fn warn(&self, msg: &str) {
        eprintln!("{}", msg.yellow());
    }

    /// Print an error message
    pub fn error(&self, msg: &str) {
        eprintln!("{}", msg.red());
    }

    pub fn print_reply(&self, request: Request, reply: &Reply) {
        let mut line = match self.format {
            OutputFormat::Text => format_reply_text(request, reply),
            OutputFormat::Csv => format_reply_csv(request, reply),
        };
        if self.raw {
            let sep = match self.format {
                OutputFormat::Text => "  ",
                OutputFormat::Csv => ",",
            };
            line.push_str(sep);
            line.push_str(&hex::encode(reply.encode()));
        }
        println!("{}", line);
    }

    /// CSV header for the tracker stream
    pub fn print_track_header(&self) {
        if self.format == OutputFormat::Csv {
            println!("from,id,x,y,yaw");
        }
    }

    pub fn print_record(&self, record: &BroadcastRecord, from: SocketAddr) {
        let p = record.position;
        match self.format {
            OutputFormat::Text => println!(
                "{} id={} x={:.3} y={:.3} yaw={:.3}",
                from.to_string().dimmed(),
                record.id.to_string().cyan(),
                p.x,
                p.y,
                p.yaw
            ),
            OutputFormat::Csv => {
                println!("{},{},{},{},{}", from, record.id, p.x, p.y, p.yaw)
            }
        }
    }
}

fn format_reply_text(request: Request, reply: &Reply) -> String {
    let value = match reply {
        Reply::Identity { id } => format!("id={}", id),
        Reply::Position(p) => format!("x={:.3} y={:.3} yaw={:.3}", p.x, p.y, p.yaw),
        Reply::Obstacle { detected: true } => "obstacle".red().to_string(),
        Reply::Obstacle { detected: false } => "clear".green().to_string(),
    };
    format!("{} {}", request.tag_str().bold(), value)
}

fn format_reply_csv(request: Request, reply: &Reply) -> String {
    let value = match reply {
        Reply::Identity { id } => id.to_string(),
        Reply::Position(p) => format!("{},{},{}", p.x, p.y, p.yaw),
        Reply::Obstacle { detected } => u8::from(*detected).to_string(),
    };
    format!("{},{}", request.tag_str(), value)
}
