mod metadata;

use std::ops::ControlFlow;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicU32, Ordering};

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use uploader_client::{
    Authenticator, ClientConfig, DefaultAuthenticator, DefaultUploader, ErrorKind, Outcome,
    Uploader,
};
use uploader_model::{Activation, Registration};
use uploader_transfer::UploadProgress;

use metadata::UploadFile;

/// Exit code for failures worth retrying later.
const EXIT_RETRY: u8 = 75;
/// Exit code for failures a user has to resolve.
const EXIT_USER: u8 = 77;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Client configuration file (JSON)
    #[arg(short, long)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and print the bearer token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Create a new account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        captcha: String,
        #[arg(long, value_enum, default_value_t = Template::Web)]
        template: Template,
        #[arg(long, default_value = "")]
        group: String,
    },
    /// Upload a measurement file
    UploadMeasurement {
        #[arg(long)]
        token: String,
        /// Measurement description (JSON)
        #[arg(long)]
        metadata: PathBuf,
        #[arg(long)]
        file: PathBuf,
    },
    /// Upload an attachment file of a measurement
    UploadAttachment {
        #[arg(long)]
        token: String,
        /// Attachment description (JSON), including `attachmentId`
        #[arg(long)]
        metadata: PathBuf,
        #[arg(long)]
        file: PathBuf,
        /// File name announced to the server; defaults to the file's name
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Template {
    AppAndroid,
    AppIos,
    Web,
}

impl From<Template> for Activation {
    fn from(t: Template) -> Self {
        match t {
            Template::AppAndroid => Activation::AppAndroid,
            Template::AppIos => Activation::AppIos,
            Template::Web => Activation::Web,
        }
    }
}

/// How a failed call should end the process.
fn exit_status(kind: Option<ErrorKind>) -> u8 {
    match kind {
        Some(k) if k.needs_user_action() => EXIT_USER,
        Some(k) if k.is_transient() => EXIT_RETRY,
        _ => 1,
    }
}

fn exit_code(kind: Option<ErrorKind>) -> ExitCode {
    ExitCode::from(exit_status(kind))
}

/// Logs every ten percent of progress.
fn progress_logger() -> impl Fn(&UploadProgress) -> ControlFlow<()> + Sync {
    let last_decile = AtomicU32::new(0);
    move |p: &UploadProgress| {
        let decile = (p.percent() / 10.0) as u32;
        if decile > last_decile.swap(decile, Ordering::Relaxed) {
            tracing::info!(
                percent = decile * 10,
                sent = p.bytes_sent,
                total = p.total_bytes,
                bytes_per_second = p.bytes_per_second as u64,
                "upload progress"
            );
        }
        ControlFlow::Continue(())
    }
}

fn report(outcome: Outcome) -> ExitCode {
    match outcome {
        Outcome::UploadSkipped => println!("skipped"),
        Outcome::UploadSuccessful | Outcome::LoginSuccessful => println!("ok"),
    }
    ExitCode::SUCCESS
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let config = ClientConfig::load(&args.config)?;

    let code = match args.command {
        Command::Login { username, password } => {
            let auth = DefaultAuthenticator::new(&config)?;
            match auth.authenticate(&username, &password).await {
                Ok(token) => {
                    println!("{token}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    tracing::error!("{e}");
                    exit_code(e.kind())
                }
            }
        }
        Command::Register {
            email,
            password,
            captcha,
            template,
            group,
        } => {
            let auth = DefaultAuthenticator::new(&config)?;
            let registration =
                Registration::new(email, password, captcha, template.into()).with_group(group);
            match auth.register(&registration).await {
                Ok(outcome) => report(outcome),
                Err(e) => {
                    tracing::error!("{e}");
                    exit_code(e.kind())
                }
            }
        }
        Command::UploadMeasurement {
            token,
            metadata,
            file,
        } => {
            let measurement = UploadFile::load(&metadata)?.measurement()?;
            let uploader = DefaultUploader::new(&config)?;
            let listener = progress_logger();
            match uploader
                .upload_measurement(&token, &measurement, &file, &listener)
                .await
            {
                Ok(outcome) => report(outcome),
                Err(e) => {
                    tracing::error!("{e}");
                    exit_code(e.kind())
                }
            }
        }
        Command::UploadAttachment {
            token,
            metadata,
            file,
            name,
        } => {
            let attachment = UploadFile::load(&metadata)?.attachment()?;
            let name = match name {
                Some(n) => n,
                None => file
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_owned)
                    .ok_or_else(|| anyhow::anyhow!("cannot derive a file name from {}", file.display()))?,
            };
            let uploader = DefaultUploader::new(&config)?;
            let listener = progress_logger();
            match uploader
                .upload_attachment(&token, &attachment, &file, &name, &listener)
                .await
            {
                Ok(outcome) => report(outcome),
                Err(e) => {
                    tracing::error!("{e}");
                    exit_code(e.kind())
                }
            }
        }
    };
    Ok(code)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,uploader_client=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Args::parse()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_upload_attachment() {
        let args = Args::try_parse_from([
            "uploader",
            "--config",
            "c.json",
            "upload-attachment",
            "--token",
            "t",
            "--metadata",
            "m.json",
            "--file",
            "/tmp/a.log",
        ])
        .unwrap();
        assert!(matches!(
            args.command,
            Command::UploadAttachment { name: None, .. }
        ));
    }

    #[test]
    fn register_template_values() {
        let args = Args::try_parse_from([
            "uploader",
            "-c",
            "c.json",
            "register",
            "--email",
            "e",
            "--password",
            "p",
            "--captcha",
            "c",
            "--template",
            "app-android",
        ])
        .unwrap();
        match args.command {
            Command::Register { template, .. } => {
                assert_eq!(Activation::from(template), Activation::AppAndroid)
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn exit_codes_follow_kind() {
        assert_eq!(exit_status(Some(ErrorKind::ServerUnavailable)), EXIT_RETRY);
        assert_eq!(exit_status(Some(ErrorKind::Unauthorized)), EXIT_USER);
        assert_eq!(exit_status(Some(ErrorKind::Conflict)), 1);
        assert_eq!(exit_status(None), 1);
    }

    #[test]
    fn progress_logger_never_cancels() {
        let listener = progress_logger();
        let p = UploadProgress {
            bytes_sent: 5,
            total_bytes: 10,
            bytes_per_second: 0.0,
        };
        assert!(listener(&p).is_continue());
    }
}
