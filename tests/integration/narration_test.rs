//! Narration channel ordering
//!
//! The channel plays at most one utterance; the latest request wins and
//! stale synthesis results are discarded without touching playback state.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::RecordingSink;
use relume_genai::mock::MockSpeechSynthesizer;
use relume_narration::{NarrationChannel, RETENTION_REMINDER};

fn channel() -> (Arc<NarrationChannel>, Arc<MockSpeechSynthesizer>, Arc<RecordingSink>) {
    let speech = Arc::new(MockSpeechSynthesizer::new());
    let sink = Arc::new(RecordingSink::new());
    let channel = Arc::new(NarrationChannel::new(speech.clone(), sink.clone()));
    (channel, speech, sink)
}

#[tokio::test(start_paused = true)]
async fn test_latest_request_wins() {
    let (channel, speech, sink) = channel();
    speech.set_delay_for("A", 1_000);
    speech.set_delay_for("B", 10);

    channel.speak("A");
    channel.speak("B");
    // Let both synthesis tasks reach their delays
    tokio::task::yield_now().await;

    // B resolves first and plays
    tokio::time::advance(Duration::from_millis(20)).await;
    tokio::task::yield_now().await;
    assert_eq!(sink.starts(), 1);
    assert!(channel.is_playing());

    // A's late resolution is stale: no second playback, no state change
    tokio::time::advance(Duration::from_millis(1_000)).await;
    tokio::task::yield_now().await;
    assert_eq!(sink.starts(), 1);
    assert!(channel.is_playing());

    // Both requests did reach the synthesizer
    assert_eq!(speech.synthesized_texts(), vec!["A".to_string(), "B".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_new_request_interrupts_current_playback() {
    let (channel, _speech, sink) = channel();

    channel.speak("first");
    tokio::time::advance(Duration::from_millis(1)).await;
    tokio::task::yield_now().await;
    assert!(channel.is_playing());

    // Issuing the next request silences the channel before synthesis
    channel.speak("second");
    assert!(!channel.is_playing());

    tokio::time::advance(Duration::from_millis(1)).await;
    tokio::task::yield_now().await;
    assert_eq!(sink.starts(), 2);
    assert!(channel.is_playing());
}

#[tokio::test(start_paused = true)]
async fn test_failed_synthesis_leaves_channel_idle() {
    let (channel, speech, sink) = channel();
    speech.set_fail(true);

    channel.speak("nothing to hear");
    tokio::time::advance(Duration::from_millis(1)).await;
    tokio::task::yield_now().await;

    assert_eq!(sink.starts(), 0);
    assert!(!channel.is_playing());
}

#[tokio::test]
async fn test_stop_is_safe_when_idle() {
    let (channel, _speech, _sink) = channel();
    channel.stop();
    assert!(!channel.is_playing());
}

#[tokio::test(start_paused = true)]
async fn test_retention_reminder_is_spoken() {
    let (channel, speech, sink) = channel();

    channel.remind_retention();
    tokio::time::advance(Duration::from_millis(1)).await;
    tokio::task::yield_now().await;

    assert_eq!(sink.starts(), 1);
    assert_eq!(speech.synthesized_texts(), vec![RETENTION_REMINDER.to_string()]);
}
