//! Default configuration values

/// Configuration file names, in lookup order
pub const CONFIG_FILE_NAMES: [&str; 3] = ["app-tester.toml", "app-tester.yaml", "app-tester.yml"];

/// SDK repository cloned next to the applications
pub const DEFAULT_SDK_URL: &str = "https://github.com/LedgerHQ/ledger-secure-sdk.git";

/// Clone directory name of the SDK
pub const DEFAULT_SDK_NAME: &str = "sdk";

/// SDK ref checked out when none is given
pub const DEFAULT_SDK_REF: &str = "origin/master";

/// Directory holding every clone
pub const DEFAULT_WORKDIR: &str = "workdir";

pub const DEFAULT_INPUT_FILE: &str = "input_files/test_input.json";
pub const DEFAULT_OUTPUT_FILE: &str = "output_files/output.json";
pub const DEFAULT_LOGS_FILE: &str = "output_files/error_logs.txt";
