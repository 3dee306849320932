use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::LevelFilter;
use outlook_bridge::{
    Config, MatchMode, MessageRecord, OutlookBridge, SearchCriteria, SearchOutcome,
};
use std::process;

fn build_cli() -> Command {
    Command::new("outlook-bridge")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Find and open emails in Microsoft Outlook for Mac via AppleScript")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/usr/local/etc/outlook-bridge.yaml")
                .global(true),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging, including generated scripts")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("open")
                .about("Open an email by subject (newest match across folders) or Message-ID")
                .arg(
                    Arg::new("subject")
                        .long("subject")
                        .value_name("TEXT")
                        .help("Email subject to search for"),
                )
                .arg(
                    Arg::new("message-id")
                        .long("message-id")
                        .value_name("ID")
                        .help("Internet Message-ID to look for in message sources"),
                )
                .arg(
                    Arg::new("folders")
                        .long("folders")
                        .value_name("FOLDER")
                        .num_args(1..)
                        .help("Folders to search, in order (default: Inbox, Sent Items, Sent)"),
                )
                .arg(exact_arg())
                .arg(contains_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("search")
                .about("Search one folder by subject and open the match")
                .arg(
                    Arg::new("subject")
                        .required(true)
                        .help("Subject text to search for"),
                )
                .arg(folder_arg())
                .arg(
                    Arg::new("message-id")
                        .long("message-id")
                        .value_name("ID")
                        .help("Internet Message-ID for exact matching among subject matches"),
                )
                .arg(exact_arg())
                .arg(contains_arg()),
        )
        .subcommand(
            Command::new("find")
                .about("Look up the first subject match in a folder without opening it")
                .arg(
                    Arg::new("subject")
                        .required(true)
                        .help("Subject text to search for (substring match)"),
                )
                .arg(folder_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("open-id")
                .about("Open an email by Outlook's own message id (as printed by find)")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(value_parser!(u64))
                        .help("Numeric Outlook message id"),
                ),
        )
        .subcommand(
            Command::new("list-folders")
                .about("List mail folders with their message counts")
                .arg(
                    Arg::new("all")
                        .long("all")
                        .help("Include empty folders")
                        .action(ArgAction::SetTrue),
                )
                .arg(json_arg()),
        )
}

fn exact_arg() -> Arg {
    Arg::new("exact")
        .long("exact")
        .help("Match the subject exactly")
        .action(ArgAction::SetTrue)
        .conflicts_with("contains")
}

fn contains_arg() -> Arg {
    Arg::new("contains")
        .long("contains")
        .help("Match the subject as a substring")
        .action(ArgAction::SetTrue)
}

fn folder_arg() -> Arg {
    Arg::new("folder")
        .long("folder")
        .value_name("FOLDER")
        .default_value("Inbox")
        .help("Folder to search in. Use list-folders to see all available folders.")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .help("Print a JSON result")
        .action(ArgAction::SetTrue)
}

#[tokio::main]
async fn main() {
    let mut cli = build_cli();
    let matches = cli.clone().get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("/usr/local/etc/outlook-bridge.yaml");

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    };

    let bridge = OutlookBridge::from_config(&config);

    let success = match matches.subcommand() {
        Some(("open", sub)) => run_open(&bridge, &config, sub, &mut cli).await,
        Some(("search", sub)) => run_search(&bridge, sub).await,
        Some(("find", sub)) => run_find(&bridge, sub).await,
        Some(("open-id", sub)) => run_open_id(&bridge, sub).await,
        Some(("list-folders", sub)) => run_list_folders(&bridge, sub).await,
        _ => {
            eprintln!("{}", cli.render_help());
            false
        }
    };

    process::exit(if success { 0 } else { 1 });
}

fn match_mode(matches: &ArgMatches, default: MatchMode) -> MatchMode {
    if matches.get_flag("exact") {
        MatchMode::Exact
    } else if matches.get_flag("contains") {
        MatchMode::Contains
    } else {
        default
    }
}

async fn run_open(
    bridge: &OutlookBridge,
    config: &Config,
    matches: &ArgMatches,
    cli: &mut Command,
) -> bool {
    let subject = matches.get_one::<String>("subject").filter(|s| !s.is_empty());
    let message_id = matches
        .get_one::<String>("message-id")
        .filter(|s| !s.trim().is_empty());

    let outcome = match (message_id, subject) {
        (Some(message_id), _) => {
            log::info!("Looking for Message-ID {message_id}");
            bridge.open_by_message_id(message_id).await
        }
        (None, Some(subject)) => {
            let folders: Vec<String> = match matches.get_many::<String>("folders") {
                Some(values) => values.cloned().collect(),
                None => config.default_folders.clone(),
            };
            log::info!("Looking for '{subject}' in {folders:?}");
            bridge
                .open_by_subject(subject, match_mode(matches, MatchMode::Contains), &folders)
                .await
        }
        (None, None) => {
            if let Some(open) = cli.find_subcommand_mut("open") {
                eprintln!("{}", open.render_help());
            }
            eprintln!("Either --subject or --message-id is required");
            return false;
        }
    };

    let what = message_id
        .map(|id| format!("Message-ID {id}"))
        .or_else(|| subject.map(|s| format!("'{s}'")))
        .unwrap_or_default();
    let success = report_failure(&outcome, &what);

    if matches.get_flag("json") {
        println!("{}", serde_json::json!({ "success": success }));
    } else if success {
        println!("✓ Email opened");
    } else {
        println!("✗ Failed to open email");
    }
    success
}

async fn run_search(bridge: &OutlookBridge, matches: &ArgMatches) -> bool {
    let subject = matches
        .get_one::<String>("subject")
        .map(String::as_str)
        .unwrap_or_default();
    let folder = matches
        .get_one::<String>("folder")
        .map(String::as_str)
        .unwrap_or("Inbox");

    println!("\nSearching for '{subject}' in {folder}...");
    let criteria = SearchCriteria::in_folder(subject, folder)
        .with_match_mode(match_mode(matches, MatchMode::Exact))
        .with_message_id(matches.get_one::<String>("message-id").map(String::as_str));

    let outcome = bridge.search(&criteria).await;
    let success = report_failure(&outcome, &format!("'{subject}' in {folder}"));
    if let Some(record) = outcome.record() {
        println!("SUCCESS: Found and opened email");
        print_record(record);
        println!("✓ Email opened successfully in Outlook");
    } else {
        println!("✗ No matching email found or error occurred");
    }
    success
}

async fn run_find(bridge: &OutlookBridge, matches: &ArgMatches) -> bool {
    let subject = matches
        .get_one::<String>("subject")
        .map(String::as_str)
        .unwrap_or_default();
    let folder = matches
        .get_one::<String>("folder")
        .map(String::as_str)
        .unwrap_or("Inbox");

    let criteria =
        SearchCriteria::in_folder(subject, folder).with_match_mode(MatchMode::Contains);
    let outcome = bridge.find(&criteria).await;
    let success = report_failure(&outcome, &format!("'{subject}' in {folder}"));

    if matches.get_flag("json") {
        let body = match outcome.record() {
            Some(record) => serde_json::json!({ "success": true, "message": record }),
            None => serde_json::json!({ "success": false }),
        };
        println!("{body}");
    } else if let Some(record) = outcome.record() {
        println!("\n{}", "=".repeat(80));
        println!("Found email in {}", folder.to_uppercase());
        println!("{}\n", "=".repeat(80));
        print_record(record);
        if let Some(id) = &record.message_id {
            println!("   Open it with: outlook-bridge open-id {id}");
        }
    } else {
        println!("\nNo emails found in {folder}.");
    }
    success
}

async fn run_open_id(bridge: &OutlookBridge, matches: &ArgMatches) -> bool {
    let Some(id) = matches.get_one::<u64>("id").copied() else {
        return false;
    };

    let outcome = bridge.open_message(id).await;
    let success = report_failure(&outcome, &format!("message id {id}"));
    if success {
        println!("✓ Email opened");
    }
    success
}

async fn run_list_folders(bridge: &OutlookBridge, matches: &ArgMatches) -> bool {
    let folders = match bridge.list_folders().await {
        Ok(folders) => folders,
        Err(e) => {
            eprintln!("Error listing folders: {e}");
            return false;
        }
    };

    let show_all = matches.get_flag("all");
    let visible: Vec<_> = folders
        .iter()
        .filter(|folder| show_all || folder.message_count > 0)
        .collect();

    if matches.get_flag("json") {
        match serde_json::to_string_pretty(&visible) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error encoding folders: {e}");
                return false;
            }
        }
        return true;
    }

    if visible.is_empty() {
        println!("No folders found.");
        return true;
    }

    println!("\n{}", "=".repeat(80));
    println!("{:<50} {:>15}", "Folder Name", "Message Count");
    println!("{}", "=".repeat(80));
    for folder in visible {
        println!("{:<50} {:>15}", folder.name, folder.message_count);
    }
    println!("{}\n", "=".repeat(80));
    true
}

/// Write diagnostics for anything but a match; returns whether it matched.
fn report_failure(outcome: &SearchOutcome, what: &str) -> bool {
    match outcome {
        SearchOutcome::Found(_) => true,
        SearchOutcome::NotFound => {
            eprintln!("Email not found: {what}");
            false
        }
        SearchOutcome::Error(e) => {
            eprintln!("Error: {e}");
            false
        }
    }
}

fn print_record(record: &MessageRecord) {
    if record.is_empty() {
        println!("   (no details reported)");
        return;
    }
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "N/A".to_string());
    println!("   Subject: {}", field(&record.subject));
    println!("   From: {}", field(&record.sender));
    println!("   Date: {}", field(&record.date));
    if let Some(folder) = &record.folder {
        println!("   Folder: {folder}");
    }
    if let Some(id) = &record.message_id {
        println!("   ID: {id}");
    }
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file(path)
    } else {
        log::debug!("Configuration file '{path}' not found, using default configuration");
        Ok(Config::default())
    }
}

fn generate_default_config(path: &str) {
    let config = Config::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the configuration file to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e}");
            process::exit(1);
        }
    }
}
