use anyhow::Result;
use clap::{Parser, Subcommand};
use protolyzer_data::{Endianness, FieldRadix};

mod commands;
mod utils;

#[derive(Parser)]
#[command(name = "protolyzer-cmd")]
#[command(about = "Command-line utility for inspecting binary records")]
#[command(version)]
struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON file with formatting options
    #[arg(long, global = true)]
    config: Option<String>,

    /// Render hex digits in lower case
    #[arg(long, global = true)]
    lowercase: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display a buffer as hex, bits and, given a layout, as fields
    Inspect {
        /// Buffer content as hex digits
        hex: String,

        /// Byte order of the buffer (big, little, native)
        #[arg(long, default_value = "big")]
        endian: Endianness,

        /// Field widths in bits, comma separated
        #[arg(long, value_delimiter = ',', conflicts_with = "bytes")]
        bits: Option<Vec<usize>>,

        /// Field widths in bytes, comma separated
        #[arg(long, value_delimiter = ',')]
        bytes: Option<Vec<usize>>,

        /// Field rendering (auto, hex, binary)
        #[arg(long, value_enum)]
        radix: Option<RadixArg>,

        /// Print a JSON summary
        #[arg(long)]
        json: bool,
    },

    /// Find the first field with at least one bit set
    Search {
        /// Buffer content as hex digits
        hex: String,

        /// Byte order of the buffer (big, little, native)
        #[arg(long, default_value = "big")]
        endian: Endianness,

        /// Field widths in bits, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        bits: Vec<usize>,

        /// Index of the first field to examine
        #[arg(long, default_value_t = 0)]
        start: usize,
    },

    /// Combine two equally long buffers bit by bit
    Combine {
        /// Left operand as hex digits
        left: String,

        /// Right operand as hex digits
        right: String,

        /// Boolean operation
        #[arg(long, value_enum)]
        op: commands::combine::Op,

        /// Byte order of the left operand
        #[arg(long, default_value = "big")]
        left_endian: Endianness,

        /// Byte order of the right operand
        #[arg(long, default_value = "big")]
        right_endian: Endianness,
    },

    /// Rotate the bits of a buffer
    Rotate {
        /// Buffer content as hex digits
        hex: String,

        /// Byte order of the buffer (big, little, native)
        #[arg(long, default_value = "big")]
        endian: Endianness,

        /// Rotate left by N bits
        #[arg(long, conflicts_with = "right", required_unless_present = "right")]
        left: Option<usize>,

        /// Rotate right by N bits
        #[arg(long)]
        right: Option<usize>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum RadixArg {
    Auto,
    Hex,
    Binary,
}

impl From<RadixArg> for FieldRadix {
    fn from(arg: RadixArg) -> Self {
        match arg {
            RadixArg::Auto => FieldRadix::Auto,
            RadixArg::Hex => FieldRadix::Hex,
            RadixArg::Binary => FieldRadix::Binary,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    utils::init_logging(cli.verbose);

    let mut options = utils::load_format_options(cli.config.as_deref())?;
    if cli.lowercase {
        options.uppercase = false;
    }

    match cli.command {
        Commands::Inspect {
            hex,
            endian,
            bits,
            bytes,
            radix,
            json,
        } => {
            if let Some(radix) = radix {
                options.field_radix = radix.into();
            }
            let widths = match (bits, bytes) {
                (Some(bits), _) => Some(commands::inspect::Widths::Bits(bits)),
                (None, Some(bytes)) => Some(commands::inspect::Widths::Bytes(bytes)),
                (None, None) => None,
            };
            commands::inspect::run(&hex, endian, widths, &options, json)
        }
        Commands::Search {
            hex,
            endian,
            bits,
            start,
        } => commands::search::run(&hex, endian, &bits, start),
        Commands::Combine {
            left,
            right,
            op,
            left_endian,
            right_endian,
        } => commands::combine::run(&left, left_endian, &right, right_endian, op, &options),
        Commands::Rotate {
            hex,
            endian,
            left,
            right,
        } => {
            let rotation = match (left, right) {
                (Some(n), _) => commands::rotate::Rotation::Left(n),
                (None, Some(n)) => commands::rotate::Rotation::Right(n),
                (None, None) => anyhow::bail!("either --left or --right is required"),
            };
            commands::rotate::run(&hex, endian, rotation, &options)
        }
    }
}
