//! Help text for `cot-decode`.

/// Print general usage information.
pub fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "cot-decode - CoT-Decoding candidate sampler v{}

USAGE:
    cot-decode [COMMAND] [OPTIONS]

COMMANDS:
    ask          Answer a single question
    chat         Continue a conversation read from a JSON file
    config       Manage configuration (show, defaults, validate)
    health       Check that the generation backend is reachable
    version      Show version information
    help         Show this help message

OPTIONS:
    --model <NAME>       Backend model name (required for ask/chat)
    --url <URL>          Backend generate endpoint
    --k <N>              Number of candidates to sample
    --temperature <T>    Sampling temperature
    --max-tokens <N>     Maximum tokens per candidate
    --timeout-ms <MS>    Per-request timeout
    --concurrency <N>    Maximum concurrent backend requests
    --debug, --no-debug  Append the candidate trace to the answer
    --config <FILE>      Load TOML overrides from file
    --json               Print JSON output
    --table              Print a per-candidate table

EXAMPLES:
    cot-decode ask --model llama3.2 --prompt \"What is 2+2?\"
    cot-decode ask --model llama3.2 --prompt \"Hi\" --k 5 --no-debug
    cot-decode chat --file conversation.json --config cot.toml
    cot-decode config show --model llama3.2
    cot-decode health

ENVIRONMENT:
    OLLAMA_API_URL            Backend generate endpoint
    COT_DECODING_MODEL        Backend model name
    COT_DECODING_K            Number of candidates
    COT_DECODING_TEMPERATURE  Sampling temperature
    COT_DECODING_MAX_TOKENS   Maximum tokens per candidate
    COT_DECODING_DEBUG        true/false
    COT_DECODING_TIMEOUT_MS   Per-request timeout
    COT_DECODING_CONCURRENCY  Maximum concurrent requests
    COT_LOG_FORMAT            text or json
    RUST_LOG                  Log level (debug, info, warn, error)

EXIT CODES:
    0  Success
    1  All candidates failed
    2  Configuration or usage error
    3  Connection error
",
        version
    );
}

/// Print detailed help for a specific command.
pub fn print_command_help(command: &str) {
    match command {
        "ask" => print_ask_help(),
        "chat" => print_chat_help(),
        "config" => print_config_help(),
        "health" => print_health_help(),
        _ => {
            eprintln!(
                "No detailed help available for '{}'. Use 'cot-decode help' for general usage.",
                command
            );
        }
    }
}

fn print_ask_help() {
    eprintln!(
        "cot-decode ask - Answer a single question

USAGE:
    cot-decode ask --prompt <TEXT> [OPTIONS]

DESCRIPTION:
    Samples k candidates with seeds 0..k-1 and prints the one with the
    highest confidence. With debug enabled the full candidate trace
    follows the answer.

EXIT CODES:
    0  Answer selected
    1  All candidates failed
    2  Configuration error
"
    );
}

fn print_chat_help() {
    eprintln!(
        "cot-decode chat - Continue a conversation

USAGE:
    cot-decode chat --file <conversation.json> [OPTIONS]

DESCRIPTION:
    The file holds a JSON array of {{\"role\", \"content\"}} objects.
    Roles other than user and assistant are treated as user turns.
"
    );
}

fn print_config_help() {
    eprintln!(
        "cot-decode config - Manage configuration

USAGE:
    cot-decode config <SUBCOMMAND> [OPTIONS]

SUBCOMMANDS:
    show           Show the resolved configuration
    validate       Validate the resolved configuration
    defaults       Show default configuration
"
    );
}

fn print_health_help() {
    eprintln!(
        "cot-decode health - Check the backend

USAGE:
    cot-decode health [--url <URL>]

EXIT CODES:
    0  Backend is healthy
    1  Backend answered with an error
    3  Connection error
"
    );
}
