//! Integration tests for Gridsub Core

use gridsub_core::{
    run, CharacterEncoding, Config, CounterMode, FileSink, MemorySink, MergePolicy, Processor,
    ReaderSource, TimeWindow,
};

// =============================================================================
// Helpers
// =============================================================================

const WIDTH: usize = 32;

/// One grid row as the decoder logs it
fn grid_row(index: usize, text: &str, colors: &str, fonts: &str) -> String {
    format!(
        "text[{index}]:{text:<32}\n\
         color[{index}]:{colors:0<32}\n\
         font[{index}]:{fonts:R<32}\n"
    )
}

fn frame(start: &str, end: &str, rows: &[String]) -> String {
    format!(
        "start_time-{start}\tend_time-{end}\n{}***END OF FRAME***\n",
        rows.concat()
    )
}

fn convert(config: &Config, log: &str) -> MemorySink {
    let mut processor = Processor::new(MemorySink::new(), config).unwrap();
    for line in log.split_inclusive('\n') {
        processor.process_line(line.as_bytes()).unwrap();
    }
    processor.finish().0
}

// =============================================================================
// Compositing Tests
// =============================================================================

#[test]
fn test_plain_row_has_no_markup() {
    let log = format!(
        "filename:out.srt\n{}",
        frame("00:00:01,000", "00:00:02,000", &[grid_row(0, "HELLO", "", "")])
    );
    let sink = convert(&Config::default(), &log);
    assert_eq!(
        sink.text("out.srt").unwrap(),
        "1\n00:00:01,000 --> 00:00:02,000\nHELLO\n\n"
    );
}

#[test]
fn test_italic_row() {
    let log = format!(
        "filename:out.srt\n{}",
        frame("00:00:01,000", "00:00:02,000", &[grid_row(0, "HI", "", "II")])
    );
    let sink = convert(&Config::default(), &log);
    assert_eq!(
        sink.text("out.srt").unwrap(),
        "1\n00:00:01,000 --> 00:00:02,000\n<i>HI</i>\n\n"
    );
}

#[test]
fn test_blank_row_suppressed_despite_italics() {
    let log = format!(
        "filename:out.srt\n{}",
        frame(
            "00:00:01,000",
            "00:00:02,000",
            &[grid_row(0, "", "", &"I".repeat(WIDTH))]
        )
    );
    let sink = convert(&Config::default(), &log);
    assert_eq!(sink.text("out.srt").unwrap(), "");
    assert_eq!(sink.writes(), 0);
}

#[test]
fn test_consecutive_frames_append() {
    let log = format!(
        "filename:out.srt\nsrt_counter-1\n{}srt_counter-2\n{}",
        frame("00:00:01,000", "00:00:02,000", &[grid_row(0, "FIRST", "", "")]),
        frame("00:00:02,000", "00:00:04,000", &[grid_row(0, "SECOND", "", "")]),
    );
    let sink = convert(&Config::default(), &log);
    assert_eq!(
        sink.text("out.srt").unwrap(),
        "1\n00:00:01,000 --> 00:00:02,000\nFIRST\n\n\
         2\n00:00:02,000 --> 00:00:04,000\nSECOND\n\n"
    );
    assert_eq!(sink.writes(), 2);
}

#[test]
fn test_rows_keep_vertical_order_without_gaps() {
    let rows = [
        grid_row(0, "", "", ""),
        grid_row(1, "TOP", "", ""),
        grid_row(2, "", "", ""),
        grid_row(3, "MIDDLE", "", ""),
        grid_row(4, "BOTTOM", "", ""),
    ];
    let log = format!("filename:out.srt\n{}", frame("00:00:01,000", "00:00:02,000", &rows));
    let sink = convert(&Config::default(), &log);
    assert!(sink.text("out.srt").unwrap().contains("\nTOP\nMIDDLE\nBOTTOM\n\n"));
}

#[test]
fn test_colored_row() {
    let log = format!(
        "filename:out.srt\n{}",
        frame(
            "00:00:01,000",
            "00:00:02,000",
            &[grid_row(0, "ALERT", "44444", "")]
        )
    );
    let sink = convert(&Config::default(), &log);
    assert!(sink
        .text("out.srt")
        .unwrap()
        .contains("\n<font color=\"#ff0000\">ALERT</font>\n"));
}

#[test]
fn test_style_precedence_and_nested_policies() {
    let log = format!(
        "filename:out.srt\n{}",
        frame(
            "00:00:01,000",
            "00:00:02,000",
            &[grid_row(0, "BOTH", "4444", "IIII")]
        )
    );

    let sink = convert(&Config::default(), &log);
    assert!(sink.text("out.srt").unwrap().contains("\n<i>BOTH</i>\n"));

    let config = Config {
        merge_policy: MergePolicy::Nested,
        ..Default::default()
    };
    let sink = convert(&config, &log);
    assert!(sink
        .text("out.srt")
        .unwrap()
        .contains("\n<font color=\"#ff0000\"><i>BOTH</i></font>\n"));
}

// =============================================================================
// Timing Tests
// =============================================================================

#[test]
fn test_timing_directive_round_trip() {
    let window = TimeWindow::parse_directive("X - 00:00:01,000\tY - 00:00:03,500").unwrap();
    assert_eq!(window.to_string(), "00:00:01,000 --> 00:00:03,500");
}

#[test]
fn test_frame_without_timing_uses_unknown_window() {
    let log = format!(
        "filename:out.srt\n{}***END OF FRAME***\n",
        grid_row(0, "UNTIMED", "", "")
    );
    let sink = convert(&Config::default(), &log);
    assert_eq!(
        sink.text("out.srt").unwrap(),
        "1\n00:00:00,000 --> 00:00:00,000\nUNTIMED\n\n"
    );
}

// =============================================================================
// Destination Tests
// =============================================================================

#[test]
fn test_destination_switching() {
    let log = format!(
        "filename:a.srt\n{}filename:b.srt\n{}filename:a.srt\n{}",
        frame("00:00:01,000", "00:00:02,000", &[grid_row(0, "A1", "", "")]),
        frame("00:00:03,000", "00:00:04,000", &[grid_row(0, "B1", "", "")]),
        frame("00:00:05,000", "00:00:06,000", &[grid_row(0, "A2", "", "")]),
    );
    let config = Config {
        counter: CounterMode::Auto,
        ..Default::default()
    };
    let sink = convert(&config, &log);

    assert_eq!(
        sink.text("a.srt").unwrap(),
        "1\n00:00:01,000 --> 00:00:02,000\nA1\n\n\
         2\n00:00:05,000 --> 00:00:06,000\nA2\n\n"
    );
    assert_eq!(
        sink.text("b.srt").unwrap(),
        "1\n00:00:03,000 --> 00:00:04,000\nB1\n\n"
    );
}

#[test]
fn test_file_sink_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let stale = dir.path().join("show.srt");
    std::fs::write(&stale, "left over from a previous run").unwrap();

    let mut processor =
        Processor::new(FileSink::new(Some(dir.path().to_path_buf())), &Config::default()).unwrap();
    let log = format!(
        "filename:show.srt\n{}",
        frame("00:00:01,000", "00:00:02,000", &[grid_row(0, "ON DISK", "", "")])
    );
    for line in log.split_inclusive('\n') {
        processor.process_line(line.as_bytes()).unwrap();
    }
    let (_, stats) = processor.finish();

    assert_eq!(stats.blocks_written, 1);
    assert_eq!(stats.destinations, vec!["show.srt".to_string()]);
    assert_eq!(
        std::fs::read_to_string(&stale).unwrap(),
        "1\n00:00:01,000 --> 00:00:02,000\nON DISK\n\n"
    );
}

#[test]
fn test_unwritable_destination_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();

    let mut processor =
        Processor::new(FileSink::new(Some(blocker)), &Config::default()).unwrap();
    let err = processor
        .process_line(b"filename:nested/out.srt\n")
        .unwrap_err();
    assert!(!err.is_recoverable());
    assert_eq!(err.error_code(), "SINK_UNAVAILABLE");
}

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_latin1_log_round_trip() {
    let config = Config {
        encoding: CharacterEncoding::Latin1,
        ..Default::default()
    };
    let mut processor = Processor::new(MemorySink::new(), &config).unwrap();

    let mut text_row = b"text[0]:CAF\xc9".to_vec();
    text_row.extend(std::iter::repeat(b' ').take(WIDTH - 4));
    text_row.push(b'\n');

    let lines: Vec<Vec<u8>> = vec![
        b"filename:out.srt\n".to_vec(),
        b"start_time-00:00:01,000\tend_time-00:00:02,000\n".to_vec(),
        text_row,
        format!("color[0]:{}\n", "0".repeat(WIDTH)).into_bytes(),
        format!("font[0]:{}\n", "R".repeat(WIDTH)).into_bytes(),
        b"***END OF FRAME***\n".to_vec(),
    ];
    for line in &lines {
        processor.process_line(line).unwrap();
    }

    let (sink, _) = processor.finish();
    assert_eq!(
        sink.contents("out.srt").unwrap(),
        b"1\n00:00:01,000 --> 00:00:02,000\nCAF\xc9\n\n"
    );
}

// =============================================================================
// Source Tests
// =============================================================================

#[tokio::test]
async fn test_run_reader_source() {
    let log = format!(
        "decoder banner\nfilename:out.srt\n{}{}",
        frame("00:00:01,000", "00:00:02,000", &[grid_row(0, "ONE", "", "")]),
        frame("00:00:02,000", "00:00:03,000", &[grid_row(0, "", "", "")]),
    );
    let mut source = ReaderSource::new(log.as_bytes());
    let mut processor = Processor::new(MemorySink::new(), &Config::default()).unwrap();

    let stats = run(&mut source, &mut processor).await.unwrap();
    assert_eq!(stats.frames, 2);
    assert_eq!(stats.blocks_written, 1);
    assert_eq!(stats.empty_frames, 1);
    assert_eq!(stats.lines_ignored, 1);
}

#[test]
fn test_run_blocking() {
    let log = format!(
        "filename:out.srt\n{}",
        frame("00:00:01,000", "00:00:02,000", &[grid_row(0, "SYNC", "", "")])
    );
    let mut source = ReaderSource::new(log.as_bytes());
    let mut processor = Processor::new(MemorySink::new(), &Config::default()).unwrap();

    let stats = tokio_test::block_on(run(&mut source, &mut processor)).unwrap();
    assert_eq!(stats.blocks_written, 1);
}

#[test]
fn test_stats_serialize() {
    let log = format!(
        "filename:out.srt\n{}",
        frame("00:00:01,000", "00:00:02,000", &[grid_row(0, "X", "", "")])
    );
    let mut processor = Processor::new(MemorySink::new(), &Config::default()).unwrap();
    for line in log.split_inclusive('\n') {
        processor.process_line(line.as_bytes()).unwrap();
    }
    let json = serde_json::to_value(processor.stats()).unwrap();
    assert_eq!(json["blocks_written"], 1);
    assert_eq!(json["destinations"][0], "out.srt");
}
