use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ikbus_frame::{PacketReader, ReaderConfig};
use ikbus_message::{ModuleTable, ParserChain, Profile, UnknownMessage};
use tracing::{debug, info};

use crate::cmd::DumpArgs;
use crate::exit::{frame_error, io_error, message_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE};
use crate::output::{print_element, OutputFormat};

pub fn run(args: DumpArgs, format: OutputFormat) -> CliResult<i32> {
    let byte_timeout = parse_duration(&args.byte_timeout)?;
    let profile = match &args.modules {
        Some(path) => Some(load_profile(path)?),
        None => None,
    };

    let input = open_input(args.path.as_deref())?;
    let mut reader = PacketReader::from_stream_with_config(input, ReaderConfig { byte_timeout })
        .map_err(|err| frame_error("failed to start reader", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        let element = match reader.read() {
            Ok(Some(element)) => element,
            Ok(None) => break,
            Err(err) => return Err(frame_error("read failed", err)),
        };

        if args.valid_only && !element.is_valid() {
            continue;
        }

        let description = match (&profile, element.packet()) {
            (Some(profile), Some(packet)) => Some(
                profile
                    .describe_packet(packet)
                    .map_err(|err| message_error("describe failed", err))?,
            ),
            _ => None,
        };

        print_element(printed, &element, description.as_deref(), format);
        printed = printed.saturating_add(1);

        if args.count.is_some_and(|count| printed >= count) {
            break;
        }
    }

    debug!(printed, "dump finished");
    reader
        .close()
        .map_err(|err| frame_error("close failed", err))?;
    Ok(SUCCESS)
}

fn open_input(path: Option<&Path>) -> CliResult<Box<dyn Read + Send>> {
    match path {
        None => Ok(Box::new(std::io::stdin())),
        Some(path) if path.as_os_str() == "-" => Ok(Box::new(std::io::stdin())),
        Some(path) => {
            info!(path = %path.display(), "reading bus data");
            let file = File::open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
            Ok(Box::new(file))
        }
    }
}

fn load_profile(path: &Path) -> CliResult<Profile<UnknownMessage>> {
    let file = File::open(path)
        .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
    let modules = ModuleTable::from_reader(std::io::BufReader::new(file))
        .map_err(|err| message_error(&format!("failed loading {}", path.display()), err))?;
    debug!(modules = modules.len(), "module table loaded");

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "modules".to_string());
    Ok(Profile::new(name, modules, ParserChain::new()))
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(number) => (number, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("50ms").unwrap(), Duration::from_millis(50));
        assert_eq!(parse_duration(" 3 ").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0ms").is_err());
        assert!(parse_duration("").is_err());
        assert!(parse_duration("fast").is_err());
        assert_eq!(parse_duration("-5ms").unwrap_err().code, USAGE);
    }

    #[test]
    fn missing_module_table_is_not_found() {
        let err = load_profile(Path::new("/nonexistent/ikbus-modules.json")).unwrap_err();
        assert_eq!(err.code, crate::exit::NOT_FOUND);
    }
}
