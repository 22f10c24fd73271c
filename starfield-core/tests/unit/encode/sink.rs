use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 4,
        height: 2,
        fps: Fps { num: 25, den: 1 },
        frame_count: 3,
    }
}

#[test]
fn in_memory_sink_captures_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &Frame::new(4, 2)).unwrap();
    sink.push_frame(FrameIndex(2), &Frame::new(4, 2)).unwrap();
    sink.end().unwrap();

    assert!(sink.is_finished());
    assert_eq!(sink.config(), Some(&cfg()));
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 2]);
}

#[test]
fn in_memory_sink_rejects_out_of_order_and_wrong_size() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(1), &Frame::new(4, 2)).unwrap();
    assert!(sink.push_frame(FrameIndex(1), &Frame::new(4, 2)).is_err());
    assert!(sink.push_frame(FrameIndex(0), &Frame::new(4, 2)).is_err());
    assert!(sink.push_frame(FrameIndex(2), &Frame::new(2, 4)).is_err());
}

#[test]
fn push_before_begin_fails() {
    let mut sink = InMemorySink::new();
    assert!(sink.push_frame(FrameIndex(0), &Frame::new(4, 2)).is_err());
}
