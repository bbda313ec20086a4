use ikbus_frame::{parse_hex, Packet};

use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_packet, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = parse_hex(&args.data).map_err(|err| frame_error("invalid --data", err))?;
    let packet = Packet::new(args.source, args.destination, payload)
        .map_err(|err| frame_error("encode failed", err))?;

    print_packet(&packet, format);
    Ok(SUCCESS)
}
