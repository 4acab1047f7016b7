use clap::Parser;
use price_tracker::config::*;
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_default_backend() {
    assert_eq!(DEFAULT_API_BASE_URL, "http://0.0.0.0:8000");
    assert_eq!(STATUS_POLL_INTERVAL_SECS, 60);
}

#[test]
fn test_bots_defined() {
    let names: Vec<&str> = BOTS.iter().map(|b| b.name).collect();
    assert_eq!(names, vec!["Nausys", "MMK"]);
    assert_eq!(BOTS[0].id, 1);
    assert_eq!(BOTS[1].id, 2);
}

#[test]
fn test_bot_state_keys() {
    assert_eq!(
        bot_state_keys(BOTS),
        vec!["botState_Nausys".to_string(), "botState_MMK".to_string()]
    );
}

#[test]
fn test_own_vessels_defined() {
    assert_eq!(OWN_VESSELS.len(), 5);
    assert_eq!(own_vessel("52110487").map(|v| v.name), Some("Athena 5"));
    assert!(own_vessel("nope").is_none());
    for vessel in OWN_VESSELS {
        assert!(!vessel.id.is_empty());
        assert!(!vessel.name.is_empty());
    }
}

#[test]
fn test_config_from_args() {
    let args = CliArgs::try_parse_from([
        "price-tracker",
        "--base-url",
        "https://pricing.example.com",
        "--state-file",
        "/tmp/storage.json",
        "status",
    ])
    .unwrap();

    let config = DashboardConfig::from_args(&args).unwrap();
    assert_eq!(config.base_url.as_str(), "https://pricing.example.com/");
    assert_eq!(config.state_file, PathBuf::from("/tmp/storage.json"));
    assert_eq!(config.poll_interval, Duration::from_secs(60));
    assert_eq!(config.bot("mmk").map(|b| b.id), Some(2));
}

#[test]
fn test_config_rejects_bad_base_url() {
    let args =
        CliArgs::try_parse_from(["price-tracker", "--base-url", "not a url", "logout"]).unwrap();
    assert!(DashboardConfig::from_args(&args).is_err());
}

#[test]
fn test_default_state_file_name() {
    assert!(default_state_file().ends_with("price-tracker/local-storage.json"));
}

#[test]
fn test_select_parses_dotted_date() {
    let args = CliArgs::try_parse_from([
        "price-tracker",
        "select",
        "--bot",
        "Nausys",
        "--date",
        "01.06.2024",
        "--competitor",
        "X",
    ])
    .unwrap();

    match args.command {
        Command::Select {
            bot,
            date,
            competitor,
            vessel,
            own_vessel,
        } => {
            assert_eq!(bot, "Nausys");
            assert_eq!(date, chrono::NaiveDate::from_ymd_opt(2024, 6, 1));
            assert_eq!(competitor.as_deref(), Some("X"));
            assert!(vessel.is_none());
            assert!(own_vessel.is_none());
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_vessels_takes_no_bot() {
    let args = CliArgs::try_parse_from(["price-tracker", "vessels"]).unwrap();
    assert!(matches!(args.command, Command::Vessels));
    assert!(CliArgs::try_parse_from(["price-tracker", "competitors"]).is_err());
}
