//! CLI binary for generating and checking PIX BR Code payloads.

use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use owo_colors::OwoColorize;
use pix_brcode::brcode::{BrCode, BrCodeEncoder};
use pix_brcode::config::MerchantProfile;
use pix_brcode::decode::{DecodedPayment, decode};
use pix_brcode::escpos::{QrOptions, qr_code_commands};
use pix_brcode::models::{ErrorCorrection, LengthPolicy, PixPaymentRequest, TransactionId};
use qrcode::QrCode;
use qrcode::render::unicode::Dense1x2;

/// Environment variable holding the default merchant name.
const MERCHANT_NAME_ENV: &str = "PIX_MERCHANT_NAME";

/// Environment variable holding the default merchant city.
const MERCHANT_CITY_ENV: &str = "PIX_MERCHANT_CITY";

/// PIX BR Code tool: build, verify and print payment payloads.
#[derive(Debug, Parser)]
#[command(name = "pix", version, about)]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Build a payload from flags or a JSON request file.
    Encode(EncodeArgs),
    /// Verify a payload's checksum and show its fields.
    Decode {
        /// Payload text to check.
        payload: String,
        /// Print the decoded fields as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the CRC-16/CCITT-FALSE checksum of arbitrary text.
    Crc {
        /// Text to checksum.
        text: String,
    },
}

/// Arguments for the `encode` subcommand.
#[derive(Debug, Default, Args)]
struct EncodeArgs {
    /// JSON request file (camelCase fields); replaces the other request
    /// flags.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["name", "city", "amount", "description", "transaction_id"])]
    request: Option<PathBuf>,
    /// Merchant name (default: $PIX_MERCHANT_NAME).
    #[arg(long)]
    name: Option<String>,
    /// Merchant city (default: $PIX_MERCHANT_CITY).
    #[arg(long)]
    city: Option<String>,
    /// Amount in reais; 0 leaves the amount to the payer.
    #[arg(long)]
    amount: Option<f64>,
    /// Reference label shown by the wallet.
    #[arg(long)]
    description: Option<String>,
    /// Transaction reference (default: generated from the clock).
    #[arg(long)]
    transaction_id: Option<String>,
    /// Truncate an over-long merchant name or city instead of failing.
    #[arg(long)]
    truncate: bool,
    /// Also draw the payload as a QR code in the terminal.
    #[arg(long)]
    qr: bool,
    /// Write ESC/POS QR printing commands to this file.
    #[arg(long, value_name = "FILE")]
    escpos: Option<PathBuf>,
    /// QR module size in printer dots (1 to 16).
    #[arg(long, default_value_t = 6)]
    module_size: u8,
    /// QR error-correction level (L, M, Q or H).
    #[arg(long, default_value = "M", value_parser = parse_level)]
    level: ErrorCorrection,
}

/// Parses an error-correction level for clap.
fn parse_level(s: &str) -> Result<ErrorCorrection, String> {
    s.parse().map_err(|err| format!("{err}"))
}

/// Writes a red `error:` line to stderr.
fn report(message: &str) -> io::Result<()> {
    writeln!(io::stderr().lock(), "{} {message}", "error:".red().bold())
}

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    dispatch(cli.command)
}

/// Dispatches to the appropriate subcommand handler.
fn dispatch(command: Command) -> io::Result<ExitCode> {
    match command {
        Command::Encode(args) => cmd_encode(&args, |key| std::env::var(key).ok()),
        Command::Decode { payload, json } => cmd_decode(&payload, json),
        Command::Crc { text } => cmd_crc(&text),
    }
}

/// Resolves the merchant from flags, falling back to `lookup` for the
/// environment variables.
///
/// Returns `Ok(None)` (error already printed) if either part is missing.
fn resolve_merchant<F>(args: &EncodeArgs, lookup: F) -> io::Result<Option<MerchantProfile>>
where
    F: Fn(&str) -> Option<String>,
{
    let name = args
        .name
        .clone()
        .or_else(|| lookup(MERCHANT_NAME_ENV))
        .filter(|value| !value.is_empty());
    let city = args
        .city
        .clone()
        .or_else(|| lookup(MERCHANT_CITY_ENV))
        .filter(|value| !value.is_empty());
    match (name, city) {
        (Some(merchant_name), Some(merchant_city)) => {
            Ok(Some(MerchantProfile::new(merchant_name, merchant_city)))
        }
        (None, _) => {
            report(&format!(
                "merchant name missing: pass --name or set {}",
                MERCHANT_NAME_ENV.bold()
            ))?;
            Ok(None)
        }
        (Some(_), None) => {
            report(&format!(
                "merchant city missing: pass --city or set {}",
                MERCHANT_CITY_ENV.bold()
            ))?;
            Ok(None)
        }
    }
}

/// Reads a JSON payment request from `path`.
fn load_request(path: &Path) -> Result<PixPaymentRequest, Box<dyn core::error::Error>> {
    let text = fs::read_to_string(path)?;
    let request = serde_json::from_str(&text).map_err(pix_brcode::error::BrCodeError::from)?;
    Ok(request)
}

/// Builds the payment request from a request file or from flags.
///
/// Returns `Ok(None)` (error already printed) if the request cannot be
/// assembled.
fn build_request<F>(args: &EncodeArgs, lookup: F) -> io::Result<Option<PixPaymentRequest>>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = args.request.as_deref() {
        return match load_request(path) {
            Ok(request) => Ok(Some(request)),
            Err(err) => {
                report(&format!("failed to read {}: {err}", path.display()))?;
                Ok(None)
            }
        };
    }

    let Some(profile) = resolve_merchant(args, lookup)? else {
        return Ok(None);
    };
    let mut request = PixPaymentRequest::for_merchant(&profile, args.amount.unwrap_or(0.0));
    if let Some(text) = args.description.as_deref() {
        request = request.description(text);
    }
    if let Some(id) = args.transaction_id.as_deref() {
        request = request.transaction_id(TransactionId::from(id));
    }
    Ok(Some(request))
}

/// Executes the `encode` subcommand.
fn cmd_encode<F>(args: &EncodeArgs, lookup: F) -> io::Result<ExitCode>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(request) = build_request(args, lookup)? else {
        return Ok(ExitCode::FAILURE);
    };

    let policy = if args.truncate {
        LengthPolicy::Truncate
    } else {
        LengthPolicy::Reject
    };
    let encoder = BrCodeEncoder::builder().length_policy(policy).build();

    let code = match encoder.encode(&request) {
        Ok(code) => code,
        Err(err) => {
            report(&format!("could not generate PIX code: {err}"))?;
            writeln!(
                io::stderr().lock(),
                "  {} check the merchant configuration",
                "hint:".cyan()
            )?;
            return Ok(ExitCode::FAILURE);
        }
    };

    writeln!(io::stdout().lock(), "{code}")?;

    if args.qr {
        match render_qr(&code) {
            Ok(drawing) => writeln!(io::stdout().lock(), "\n{drawing}")?,
            Err(err) => {
                report(&format!("failed to draw QR code: {err}"))?;
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    if let Some(path) = args.escpos.as_deref() {
        let options = QrOptions::new()
            .module_size(args.module_size)
            .error_correction(args.level);
        return write_escpos(path, &code, &options);
    }

    Ok(ExitCode::SUCCESS)
}

/// Writes the ESC/POS QR block for `code` to `path`.
fn write_escpos(path: &Path, code: &BrCode, options: &QrOptions) -> io::Result<ExitCode> {
    let bytes = match qr_code_commands(code.as_str(), options) {
        Ok(bytes) => bytes,
        Err(err) => {
            report(&format!("failed to build printer commands: {err}"))?;
            return Ok(ExitCode::FAILURE);
        }
    };
    if let Err(err) = fs::write(path, &bytes) {
        report(&format!("failed to write {}: {err}", path.display()))?;
        return Ok(ExitCode::FAILURE);
    }
    tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote ESC/POS commands");
    Ok(ExitCode::SUCCESS)
}

/// Draws `code` as a QR code using half-block characters.
fn render_qr(code: &BrCode) -> Result<String, qrcode::types::QrError> {
    let qr = QrCode::new(code.as_str().as_bytes())?;
    Ok(qr
        .render::<Dense1x2>()
        .dark_color(Dense1x2::Light)
        .light_color(Dense1x2::Dark)
        .build())
}

/// Executes the `decode` subcommand.
fn cmd_decode(payload: &str, json: bool) -> io::Result<ExitCode> {
    let decoded = match decode(payload.trim()) {
        Ok(decoded) => decoded,
        Err(err) => {
            report(&format!("invalid payload: {err}"))?;
            return Ok(ExitCode::FAILURE);
        }
    };
    if json {
        match serde_json::to_string_pretty(&decoded) {
            Ok(text) => writeln!(io::stdout().lock(), "{text}")?,
            Err(err) => {
                report(&format!("failed to serialize: {err}"))?;
                return Ok(ExitCode::FAILURE);
            }
        }
    } else {
        print_decoded_table(&decoded)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `crc` subcommand.
fn cmd_crc(text: &str) -> io::Result<ExitCode> {
    writeln!(io::stdout().lock(), "{}", pix_brcode::crc::checksum(text))?;
    Ok(ExitCode::SUCCESS)
}

// ── Output formatting ────────────────────────────────────────────────

/// Prints decoded payment fields in a table.
fn print_decoded_table(decoded: &DecodedPayment) -> io::Result<()> {
    let mut out = io::stdout().lock();

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Field").fg(Color::Cyan),
        Cell::new("Value").fg(Color::Cyan),
    ]);

    let amount = decoded
        .amount
        .map_or_else(|| "\u{2014}".to_owned(), |value| format!("R$ {value}"));
    let transaction_id = decoded
        .transaction_id
        .as_ref()
        .map_or_else(|| "\u{2014}".to_owned(), ToString::to_string);
    let description = decoded.description.as_deref().unwrap_or("\u{2014}");

    let rows: &[(&str, &str)] = &[
        ("Merchant", decoded.merchant_name.as_str()),
        ("City", decoded.merchant_city.as_str()),
        ("Amount", amount.as_str()),
        ("Transaction", transaction_id.as_str()),
        ("Description", description),
        ("Checksum", decoded.checksum.as_str()),
    ];
    for &(name, value) in rows {
        _ = table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }

    writeln!(
        out,
        "{} {}",
        "Valid PIX payload".green().bold(),
        format_args!("(CRC {})", decoded.checksum).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Entry point.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            // Last-resort output; if stderr itself failed there is nothing
            // left to report to.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}
