use edcmeter_codec::CHANNELS;

use crate::cmd::ChannelsArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_channels, OutputFormat};

pub fn run(_args: ChannelsArgs, format: OutputFormat) -> CliResult<i32> {
    print_channels(CHANNELS, format);
    Ok(SUCCESS)
}
