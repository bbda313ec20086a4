use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("ikbus {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: ikbus");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("IKBUS_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "features: message={}, async={}, cli=true",
        cfg!(feature = "message"),
        cfg!(feature = "async")
    );
    println!(
        "default_byte_timeout_ms: {}",
        ikbus_frame::DEFAULT_BYTE_TIMEOUT.as_millis()
    );

    Ok(SUCCESS)
}
