#![deny(unsafe_code)]
//! CLI for inspecting state the gles-extras extractors work from.
//!
//! Subcommands:
//! - `resolve <state.json>` -- resolve the read framebuffer size per thread
//! - `native-buffer <dump>` -- parse a dumped `ANativeWindowBuffer`
//! - `magic` -- print the known native object magic tags

mod error;

use clap::{Parser, Subcommand, ValueEnum};
use error::CliError;
use gles_extras_core::native_buffer::{ANDROID_NATIVE_BUFFER_MAGIC, ANDROID_NATIVE_WINDOW_MAGIC};
use gles_extras_core::{
    parse_native_buffer, resolve_color_attachment0_size, AttachmentSize, ContextStateGraph,
    NativeBufferLayout, ThreadId, ToExtra,
};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "gles-extras", about = "Inspect GLES state snapshots and native buffers")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve color attachment 0 of each thread's read framebuffer.
    Resolve {
        /// Context state snapshot (JSON).
        state: PathBuf,

        /// Only resolve this thread.
        #[arg(short, long)]
        thread: Option<u64>,
    },
    /// Parse a raw ANativeWindowBuffer memory dump.
    NativeBuffer {
        /// File holding the dumped bytes.
        dump: PathBuf,

        /// Pointer width of the process the dump came from.
        #[arg(long, value_enum, default_value = "64")]
        pointer_width: PointerWidth,
    },
    /// Print the native object magic tags.
    Magic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PointerWidth {
    #[value(name = "32")]
    Bits32,
    #[value(name = "64")]
    Bits64,
}

impl PointerWidth {
    fn layout(self) -> NativeBufferLayout {
        match self {
            PointerWidth::Bits32 => NativeBufferLayout::ABI32,
            PointerWidth::Bits64 => NativeBufferLayout::ABI64,
        }
    }
}

fn load_state(path: &Path) -> Result<ContextStateGraph, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("failed to read {}: {e}", path.display())))?;
    Ok(ContextStateGraph::from_json(&text)?)
}

/// Resolution result for each requested thread, in thread order.
fn resolve_threads(
    graph: &ContextStateGraph,
    thread: Option<u64>,
) -> Result<Vec<(ThreadId, Option<AttachmentSize>)>, CliError> {
    let threads: Vec<ThreadId> = match thread {
        Some(id) => {
            let id = ThreadId(id);
            if !graph.threads().any(|t| t == id) {
                return Err(CliError::Input(format!("no context bound on thread {}", id.0)));
            }
            vec![id]
        }
        None => graph.threads().collect(),
    };
    Ok(threads
        .into_iter()
        .map(|t| (t, resolve_color_attachment0_size(graph, t)))
        .collect())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Resolve { state, thread } => {
            let graph = load_state(&state)?;
            let results = resolve_threads(&graph, thread)?;
            if cli.json {
                let entries: Vec<_> = results
                    .iter()
                    .map(|(t, size)| serde_json::json!({ "thread": t.0, "size": size }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for (t, size) in results {
                    match size {
                        Some(s) => println!("thread {}: {}x{}", t.0, s.width, s.height),
                        None => println!("thread {}: not resolvable", t.0),
                    }
                }
            }
        }
        Command::NativeBuffer {
            dump,
            pointer_width,
        } => {
            let bytes = std::fs::read(&dump)
                .map_err(|e| CliError::Io(format!("failed to read {}: {e}", dump.display())))?;
            let extra = parse_native_buffer(&bytes, pointer_width.layout())
                .map_err(|e| CliError::Extraction(e.into()))?;
            tracing::debug!(bytes = bytes.len(), ?pointer_width, "parsed native buffer dump");
            if cli.json {
                println!("{}", extra.to_extra().to_json()?);
            } else {
                println!(
                    "{}x{} stride={} format={} usage={:#x}",
                    extra.width, extra.height, extra.stride, extra.format, extra.usage
                );
            }
        }
        Command::Magic => {
            if cli.json {
                let info = serde_json::json!({
                    "buffer": ANDROID_NATIVE_BUFFER_MAGIC,
                    "window": ANDROID_NATIVE_WINDOW_MAGIC,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("_bfr  {ANDROID_NATIVE_BUFFER_MAGIC:#010x}");
                println!("_wnd  {ANDROID_NATIVE_WINDOW_MAGIC:#010x}");
            }
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gles_extras_core::{Attachment, Context, Framebuffer, FramebufferId, Renderbuffer};
    use std::io::Write;
    use std::sync::Arc;

    fn sample_graph() -> ContextStateGraph {
        let mut ctx = Context::new();
        ctx.insert_framebuffer(
            FramebufferId(1),
            Framebuffer::new().with_color_attachment(
                0,
                Attachment::Renderbuffer {
                    renderbuffer: Arc::new(Renderbuffer::new(320, 200)),
                },
            ),
        );
        ctx.bind_read_framebuffer(FramebufferId(1));
        let mut graph = ContextStateGraph::new();
        graph.bind(ThreadId(1), ctx);
        graph.bind(ThreadId(2), Context::new());
        graph
    }

    #[test]
    fn load_state_reads_snapshot_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(sample_graph().to_json().unwrap().as_bytes())
            .unwrap();
        let graph = load_state(file.path()).unwrap();
        assert_eq!(graph, sample_graph());
    }

    #[test]
    fn load_state_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_state(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.exit_code(), 11);
    }

    #[test]
    fn load_state_malformed_file_is_input_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"contexts\": []}").unwrap();
        let err = load_state(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn resolve_all_threads_in_order() {
        let results = resolve_threads(&sample_graph(), None).unwrap();
        assert_eq!(
            results,
            vec![
                (ThreadId(1), Some(AttachmentSize::new(320, 200))),
                (ThreadId(2), None),
            ]
        );
    }

    #[test]
    fn resolve_unknown_thread_is_input_error() {
        let err = resolve_threads(&sample_graph(), Some(7)).err().unwrap();
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn pointer_width_selects_abi_layout() {
        assert_eq!(PointerWidth::Bits32.layout(), NativeBufferLayout::ABI32);
        assert_eq!(PointerWidth::Bits64.layout(), NativeBufferLayout::ABI64);
    }

    #[test]
    fn cli_parses_native_buffer_pointer_width() {
        let cli = Cli::try_parse_from(["gles-extras", "native-buffer", "dump.bin", "--pointer-width", "32"])
            .unwrap();
        match cli.command {
            Command::NativeBuffer { pointer_width, .. } => {
                assert_eq!(pointer_width, PointerWidth::Bits32)
            }
            _ => panic!("expected native-buffer subcommand"),
        }
    }

    #[test]
    fn cli_rejects_unknown_pointer_width() {
        let parsed = Cli::try_parse_from(["gles-extras", "native-buffer", "d", "--pointer-width", "16"]);
        assert!(parsed.is_err());
    }
}
