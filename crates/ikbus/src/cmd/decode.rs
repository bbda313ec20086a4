use ikbus_frame::{decode_packet, parse_hex};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_packet, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let wire = parse_hex(&args.hex.join(" ")).map_err(|err| frame_error("invalid input", err))?;
    let packet = decode_packet(&wire).map_err(|err| frame_error("decode failed", err))?;

    print_packet(&packet, format);
    Ok(SUCCESS)
}
