//! Implements the CLI for the device file generator

mod cli;
mod input;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use clap::Parser;
use cli::Cli;
use cli::Commands;
use devicefile_core::DeviceProperties;
use devicefile_core::Element;
use devicefile_core::GeneratorConfigBuilder;
use devicefile_core::LookupError;
use devicefile_core::build_driver_tree;
use devicefile_core::find_device_file;
use devicefile_core::output;
use devicefile_types::Device;
use devicefile_types::DeviceIdentifier;
use eyre::WrapErr;
use proc_exit::Code;
use proc_exit::Exit;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> eyre::Result<Exit> {
    color_eyre::install()?;
    // Logs go to stderr, stdout is reserved for results
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            input,
            pins,
            output,
            usi,
        } => generate(&input, pins.as_deref(), output, usi)?,
        Commands::Find { devices, device } => match find_device_file(&devices, &device) {
            Ok(path) => println!("{path}"),
            Err(err @ LookupError::DeviceFileNotFound { .. }) => {
                tracing::error!("{err}");
                return Ok(Exit::new(Code::FAILURE));
            }
            Err(err) => return Err(err.into()),
        },
        Commands::Properties { devices, device } => {
            let properties = match properties(&devices, &device) {
                Ok(properties) => properties,
                Err(err) if is_not_found(&err) => {
                    tracing::error!("{err}");
                    return Ok(Exit::new(Code::FAILURE));
                }
                Err(err) => return Err(err),
            };
            println!("{}", serde_json::to_string_pretty(&properties)?);
        }
    }
    Ok(Exit::new(Code::SUCCESS))
}

fn generate(
    input: &Utf8Path,
    pins: Option<&Utf8Path>,
    output_dir: Option<Utf8PathBuf>,
    usi: bool,
) -> eyre::Result<()> {
    let mut builder = GeneratorConfigBuilder::default();
    builder.usi_driver(usi);
    if let Some(output_dir) = output_dir {
        builder.output_dir(output_dir);
    }
    let config = builder.build()?;

    let records = input::load_records(input)?;
    let pins = input::load_pins(pins)?;
    let device = Device::from_records(&records).wrap_err("Invalid device records")?;
    let tree = build_driver_tree(&device, &pins, &config)
        .wrap_err_with(|| format!("Failed to build driver tree for {}", device.ids()))?;
    let path = output::write_to_folder(&tree, &config.output_dir)?;
    println!("{path}");
    Ok(())
}

/// Properties of `device` from its device file.
///
/// Device strings that don't follow a known naming scheme only get the values
/// shared by every device in the file.
fn properties(devices: &Utf8Path, device: &str) -> eyre::Result<DeviceProperties> {
    let path = find_device_file(devices, device)?;
    let text = std::fs::read_to_string(&path).wrap_err_with(|| format!("Failed to read {path}"))?;
    let element = Element::from_xml(&text).wrap_err_with(|| format!("Failed to parse {path}"))?;
    let id = DeviceIdentifier::parse(device).unwrap_or_else(|err| {
        tracing::debug!("Using unscoped values of {path}: {err}");
        DeviceIdentifier::default()
    });
    Ok(DeviceProperties::for_device(&element, &id)?)
}

fn is_not_found(err: &eyre::Report) -> bool {
    matches!(
        err.downcast_ref::<LookupError>(),
        Some(LookupError::DeviceFileNotFound { .. })
    )
}
