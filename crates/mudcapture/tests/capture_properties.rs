//! 透過 `MudTracker` 公開 API 驗證擷取行為

use mudcapture::{
    AbortReason, CaptureConfig, CaptureStatus, KnownPlayerSet, MemorySink, MudTracker,
    ScoreConfig, ScoreVariant, SharedRoster, TrackerEvent,
};

const BORDER: &str = "+-=-=-=-=-=-=-+";
const PROMPT: &str = "<100hp 50m 80mv>";

fn tracker_with(config: &CaptureConfig) -> (MudTracker, MemorySink, SharedRoster) {
    let sink = MemorySink::new();
    let roster = SharedRoster::default();
    let tracker = MudTracker::new(config)
        .unwrap()
        .with_sink(sink.clone())
        .with_roster(roster.clone());
    (tracker, sink, roster)
}

fn tracker() -> (MudTracker, MemorySink, SharedRoster) {
    tracker_with(&CaptureConfig::default())
}

fn feed(tracker: &mut MudTracker, lines: &[&str]) -> Vec<TrackerEvent> {
    lines
        .iter()
        .flat_map(|line| tracker.feed_line(line).unwrap())
        .collect()
}

#[test]
fn test_table_example() {
    let (mut tracker, sink, _) = tracker();
    feed(&mut tracker, &[BORDER, "| Name: Vzae | ... |", BORDER]);

    let received = sink.received();
    assert_eq!(received.scores.len(), 1);
    assert_eq!(received.scores[0].variant, ScoreVariant::TableShort);
    assert_eq!(received.scores[0].fields.name(), Some("Vzae"));
}

#[test]
fn test_single_border_no_snapshot() {
    let (mut tracker, sink, _) = tracker();
    feed(&mut tracker, &[BORDER, "| Name: Vzae |", "| Level: 5 |", "some chatter"]);
    assert!(sink.received().scores.is_empty());
}

#[test]
fn test_report_split() {
    let (mut tracker, sink, _) = tracker();
    feed(
        &mut tracker,
        &[
            "You are a 25 year-old elf warrior.",
            "You are standing.",
            "You are a 40 year-old human thief.",
            "You are sleeping.",
            "Rain patters on the cobblestones.",
        ],
    );

    let received = sink.received();
    assert_eq!(received.scores.len(), 2);
    assert!(!received.scores[0].text.contains("human"));
    assert!(!received.scores[1].text.contains("elf"));
}

#[test]
fn test_guard_safety() {
    let config = CaptureConfig {
        score: ScoreConfig {
            max_lines: 20,
            ..ScoreConfig::default()
        },
        ..CaptureConfig::default()
    };
    let (mut tracker, sink, _) = tracker_with(&config);

    tracker.feed_line(BORDER).unwrap();
    for i in 0..100 {
        tracker.feed_line(&format!("| Row {}: filler |", i)).unwrap();
    }

    assert!(sink.received().scores.is_empty());
    assert_eq!(
        tracker.score_status(),
        &CaptureStatus::Aborted(AbortReason::LineLimit(20))
    );
}

#[test]
fn test_room_without_exits_never_classified() {
    let (mut tracker, sink, _) = tracker();
    feed(
        &mut tracker,
        &["Temple Square [3001]", "A goblin is here.", PROMPT],
    );

    assert!(sink.received().rooms.is_empty());
    assert!(tracker.buckets().is_empty());
    assert_eq!(
        tracker.room_status(),
        &CaptureStatus::Aborted(AbortReason::MissingExits)
    );
}

#[test]
fn test_buckets_exclusive() {
    let (mut tracker, _, roster) = tracker();
    roster.replace(KnownPlayerSet::from_names(["vzae"]));
    feed(
        &mut tracker,
        &[
            "Temple Square [3001]",
            "[Exits: north]",
            "Vzae is here.",
            "Vzae is standing here.",
            "A goblin is here.",
            "The corpse of a goblin is here.",
            PROMPT,
        ],
    );
    assert!(tracker.buckets().is_exclusive());
    assert_eq!(tracker.buckets().players().len(), 1);
}

#[test]
fn test_scynox_reclassification() {
    let (mut tracker, sink, roster) = tracker();
    feed(
        &mut tracker,
        &[
            "Temple Square [3001]",
            "[Exits: north]",
            "Scynox the adventurer is here.",
            PROMPT,
        ],
    );
    assert!(tracker.buckets().unknown().contains("Scynox the adventurer"));
    assert!(tracker.buckets().players().is_empty());

    roster.replace(KnownPlayerSet::from_names(["scynox"]));
    assert!(tracker.on_roster_changed().unwrap());
    assert_eq!(
        tracker.buckets().players().iter().collect::<Vec<_>>(),
        vec!["Scynox"]
    );
    assert!(tracker.buckets().unknown().is_empty());

    let snapshot = tracker.buckets().clone();
    assert!(!tracker.on_roster_changed().unwrap());
    assert_eq!(tracker.buckets(), &snapshot);
    assert_eq!(sink.received().entities.len(), 1);
}

#[test]
fn test_prefix_boundary() {
    let (mut tracker, _, roster) = tracker();
    roster.replace(KnownPlayerSet::from_names(["xia"]));
    feed(
        &mut tracker,
        &["Temple Square [3001]", "[Exits: north]", "Xiantha is here.", PROMPT],
    );
    assert!(tracker.buckets().players().is_empty());
    assert!(tracker.buckets().unknown().contains("Xiantha"));

    assert!(!tracker.on_roster_changed().unwrap());
}

#[test]
fn test_arrival_then_roster_change() {
    let (mut tracker, sink, roster) = tracker();
    let events = feed(&mut tracker, &["Vzae arrives from the north."]);
    assert_eq!(events, vec![TrackerEvent::BucketsChanged]);
    assert!(tracker.buckets().unknown().contains("Vzae"));

    roster.add("Vzae");
    assert!(tracker.on_roster_changed().unwrap());
    assert!(tracker.buckets().players().contains("Vzae"));

    feed(&mut tracker, &["Vzae leaves south."]);
    assert!(tracker.buckets().is_empty());
    assert_eq!(sink.received().entities.len(), 3);
}

#[test]
fn test_replay_source_tag() {
    let config = CaptureConfig::from_json_str(r#"{ "source": "replay" }"#).unwrap();
    let (mut tracker, sink, _) = tracker_with(&config);
    feed(&mut tracker, &[BORDER, "| Name: Vzae |", BORDER]);

    let json = serde_json::to_value(&sink.received().scores[0]).unwrap();
    assert_eq!(json["source"], "replay");
    assert_eq!(json["variant"], "table_short");
}

#[test]
fn test_interleaved_prompt_and_ansi() {
    let (mut tracker, sink, _) = tracker();
    feed(
        &mut tracker,
        &[
            "\x1b[36mTemple Square [3001]\x1b[0m\r",
            PROMPT,
            "Temple Square [3001]",
            "   The square is quiet.",
            "\x1b[32m[Exits: north south]\x1b[0m",
            "\x1b[33mA goblin is here.\x1b[0m",
            PROMPT,
        ],
    );

    let received = sink.received();
    assert_eq!(received.rooms.len(), 1);
    assert_eq!(received.rooms[0].exits, vec!["north", "south"]);
    assert!(received.rooms[0].buckets.mobs().contains("A goblin"));
}

#[test]
fn test_back_to_back_titles_not_merged() {
    let (mut tracker, sink, _) = tracker();
    feed(
        &mut tracker,
        &[
            "The Temple Square",
            "   A wide square.",
            "Main Street",
            "   A busy street.",
            "Obvious exits: east",
            "A goblin is here.",
            PROMPT,
        ],
    );

    let received = sink.received();
    assert_eq!(received.rooms.len(), 1);
    assert_eq!(received.rooms[0].title, "Main Street");
    assert!(!received.rooms[0].lines.iter().any(|line| line.contains("Temple")));
}
