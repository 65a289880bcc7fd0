//! CLI entry point.
//!
//! Grounded on `dbus-codegen`'s `main.rs` (`Args`, stdin-or-file input,
//! exit-code conventions); re-expressed with `clap`'s derive API instead
//! of `structopt`+`strum` -- see `DESIGN.md`'s Open Question resolution
//! for why: `Cargo.toml` only ever declared `clap`, and `clap` has
//! absorbed `structopt`'s functionality (including case-insensitive
//! `ValueEnum` parsing) since clap 3.

use std::io::Read as _;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use dbus_codegen::{generate, ConnectionType, GenOpts, Mode, MethodType, ServerAccess, ServerBackend};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Object,
    Proxy,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ServerBackendArg {
    Tree,
    Crossroads,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MethodTypeArg {
    Fn,
    FnMut,
    Sync,
    Generic,
    Par,
    None,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ServerAccessArg {
    RefClosure,
    AsRefClosure,
    MethodInfo,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ConnectionTypeArg {
    Ffidisp,
    Blocking,
    Nonblock,
}

/// Generates Rust code from D-Bus introspection XML.
#[derive(Parser, Debug)]
#[command(name = "dbus-codegen-rust", about = "Generates Rust code from D-Bus introspection XML")]
struct Args {
    /// Whether to emit the object (server) side or the proxy (client) side.
    #[arg(long, value_enum, default_value = "object")]
    mode: ModeArg,

    /// Identifier prefix prepended to generated type/function names.
    #[arg(long, default_value = "")]
    prefix: String,

    /// Server dispatch framework to target (only used with --mode object).
    #[arg(long = "server-backend", value_enum, default_value = "crossroads")]
    server_backend: ServerBackendArg,

    /// dbus-tree method wrapper to target (only used with --server-backend tree).
    #[arg(long = "method-type", value_enum, default_value = "generic")]
    method_type: MethodTypeArg,

    /// How the dbus-tree handler accesses its data (only used with --server-backend tree).
    #[arg(long = "server-access", value_enum, default_value = "ref-closure")]
    server_access: ServerAccessArg,

    /// Connection flavor to target (only used with --mode proxy).
    #[arg(long = "client-type", value_enum, default_value = "blocking")]
    client_type: ConnectionTypeArg,

    /// Try to make variant arguments generic instead of `Variant<Box<dyn RefArg>>`.
    #[arg(long = "generic-variant")]
    generic_variant: bool,

    /// Skip this prefix when mangling interface names, e.g. "org.freedesktop.DBus.".
    #[arg(short = 'i', long = "skip-prefix")]
    skip_prefix: Option<String>,

    /// Name of the dbus crate, in case it has been renamed in Cargo.toml.
    #[arg(long = "dbus-crate", default_value = "dbus")]
    dbus_crate: String,

    /// Comma separated list of interface names; only matching interfaces are generated if set.
    #[arg(short = 'f', long = "interfaces", value_delimiter = ',')]
    interfaces: Option<Vec<String>>,

    /// Treat an unrecognized annotation as a fatal error instead of a warning.
    #[arg(long = "deny-unknown-annotations")]
    deny_unknown_annotations: bool,

    /// Write output into the specified file (defaults to stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// D-Bus introspection XML file to read (defaults to stdin).
    file: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let xml = match &args.file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: could not read {}: {}", path.display(), e);
                return ExitCode::from(2);
            }
        },
        None => {
            let mut s = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut s) {
                eprintln!("error: could not read stdin: {}", e);
                return ExitCode::from(2);
            }
            s
        }
    };

    let opts = GenOpts {
        mode: match args.mode {
            ModeArg::Object => Mode::Object,
            ModeArg::Proxy => Mode::Proxy,
        },
        prefix: args.prefix,
        server_backend: match args.server_backend {
            ServerBackendArg::Tree => ServerBackend::Tree,
            ServerBackendArg::Crossroads => ServerBackend::Crossroads,
        },
        method_type: match args.method_type {
            MethodTypeArg::Fn => MethodType::Fn,
            MethodTypeArg::FnMut => MethodType::FnMut,
            MethodTypeArg::Sync => MethodType::Sync,
            MethodTypeArg::Generic => MethodType::Generic,
            MethodTypeArg::Par => MethodType::Par,
            MethodTypeArg::None => MethodType::None,
        },
        server_access: match args.server_access {
            ServerAccessArg::RefClosure => ServerAccess::RefClosure,
            ServerAccessArg::AsRefClosure => ServerAccess::AsRefClosure,
            ServerAccessArg::MethodInfo => ServerAccess::MethodInfo,
        },
        connection_type: match args.client_type {
            ConnectionTypeArg::Ffidisp => ConnectionType::Ffidisp,
            ConnectionTypeArg::Blocking => ConnectionType::Blocking,
            ConnectionTypeArg::Nonblock => ConnectionType::Nonblock,
        },
        generic_variant: args.generic_variant,
        skip_prefix: args.skip_prefix,
        dbus_crate: args.dbus_crate,
        interfaces: args.interfaces.map(|v| v.into_iter().collect()),
        command_line: std::env::args().skip(1).collect::<Vec<_>>().join(" "),
        deny_unknown_annotations: args.deny_unknown_annotations,
    };

    let code = match generate(&xml, &opts) {
        Ok(code) => code,
        Err(e @ dbus_codegen::Error::Xml(_)) => {
            eprintln!("error: {}", e);
            return ExitCode::from(2);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(3);
        }
    };

    let result = match &args.output {
        Some(path) => std::fs::write(path, code),
        None => {
            use std::io::Write;
            std::io::stdout().write_all(code.as_bytes())
        }
    };
    if let Err(e) = result {
        eprintln!("error: could not write output: {}", e);
        return ExitCode::from(2);
    }

    ExitCode::SUCCESS
}
