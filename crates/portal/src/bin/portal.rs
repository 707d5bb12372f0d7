// ABOUTME: CLI binary for the portal client.
// ABOUTME: Parses a saved detail page or fetches case numbers live and prints the records as JSON.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use nyaya_portal::{parse_detail_page, CaseRecord, Client, DEFAULT_BASE_URL};
use nyaya_records::{normalize, to_pretty_json, Tree};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "portal")]
#[command(about = "Extract case records from the Supreme Court portal")]
struct Args {
    /// Saved detail page to parse instead of fetching
    #[arg(long = "html")]
    html: Option<PathBuf>,

    /// Portal base URL
    #[arg(long = "base-url", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Validate the portal's TLS certificate
    #[arg(long = "tls-verify")]
    tls_verify: bool,

    /// Request timeout in seconds
    #[arg(long = "timeout", default_value_t = 30)]
    timeout: u64,

    /// Clean whitespace and convert dates before printing
    #[arg(long = "normalize")]
    normalize: bool,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,

    /// Case numbers to fetch (fetch mode)
    #[arg()]
    cases: Vec<String>,
}

fn render(record: &CaseRecord, normalize_output: bool) -> Tree {
    let tree = record.to_tree();
    if normalize_output {
        normalize(&tree)
    } else {
        tree
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if args.html.is_none() && args.cases.is_empty() {
        eprintln!("error: at least one case number is required, or use --html");
        return ExitCode::from(1);
    }

    if args.html.is_some() && !args.cases.is_empty() {
        eprintln!("error: cannot use both --html and case numbers");
        return ExitCode::from(1);
    }

    let start = Instant::now();
    let mut had_error = false;

    let output = if let Some(html_path) = &args.html {
        match fs::read_to_string(html_path) {
            Ok(html) => render(&parse_detail_page(&html), args.normalize),
            Err(e) => {
                eprintln!("error reading file {:?}: {}", html_path, e);
                return ExitCode::from(1);
            }
        }
    } else {
        let client = Client::builder()
            .base_url(&args.base_url)
            .tls_verification(args.tls_verify)
            .timeout(Duration::from_secs(args.timeout))
            .build();
        let session = match client.open_session() {
            Ok(session) => session,
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::from(1);
            }
        };

        let mut records = Vec::new();
        for case in &args.cases {
            match session.fetch_record(case).await {
                Ok(Some(record)) => records.push((case.clone(), render(&record, args.normalize))),
                Ok(None) => eprintln!("no records found for {}", case),
                Err(e) => {
                    eprintln!("error fetching {}: {}", case, e);
                    had_error = true;
                }
            }
        }
        Tree::Object(records)
    };

    if args.timing {
        eprintln!("elapsed: {}ms", start.elapsed().as_millis());
    }

    match to_pretty_json(&output) {
        Ok(bytes) => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = stdout.write_all(&bytes).and_then(|_| writeln!(stdout)) {
                eprintln!("error writing output: {}", e);
                return ExitCode::from(1);
            }
        }
        Err(e) => {
            eprintln!("error serializing output: {}", e);
            return ExitCode::from(1);
        }
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
