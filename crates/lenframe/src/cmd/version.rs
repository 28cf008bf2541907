use lenframe_frame::HeaderKind;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("lenframe {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: lenframe");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("LENFRAME_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("LENFRAME_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!(
        "headers: {}",
        [HeaderKind::TwoByteUnsigned, HeaderKind::FourByteUnsigned]
            .iter()
            .filter_map(|kind| kind.width())
            .map(|width| width.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("features: async={}, cli=true", cfg!(feature = "async"));

    Ok(SUCCESS)
}
