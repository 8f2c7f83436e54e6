#![no_main]

//! Fuzz target for the history buffer.
//!
//! Replays arbitrary push/read/write sequences against a plain vector model.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sigrate_core::HistoryBuffer;

#[derive(Arbitrary, Debug)]
struct HistoryInput {
    requested: u8,
    operations: Vec<HistoryOperation>,
}

#[derive(Arbitrary, Debug)]
enum HistoryOperation {
    /// Append a value
    Push(i32),
    /// Checked read relative to the newest index
    Read(i16),
    /// Checked write relative to the newest index
    Write(i16, i32),
}

fuzz_target!(|input: HistoryInput| {
    let mut buf = match HistoryBuffer::new(input.requested as usize, 0i32) {
        Ok(buf) => buf,
        Err(_) => return,
    };
    let mut model: Vec<i32> = Vec::new();

    for op in input.operations.iter().take(1000) {
        match *op {
            HistoryOperation::Push(v) => {
                buf.push(v);
                model.push(v);
            }
            HistoryOperation::Read(offset) => {
                let n = buf.max_index() + offset as i64;
                match buf.try_read(n) {
                    Ok(v) => {
                        assert!(buf.contains(n));
                        let expected = if n < 0 { 0 } else { model[n as usize] };
                        assert_eq!(*v, expected);
                    }
                    Err(_) => assert!(!buf.contains(n)),
                }
            }
            HistoryOperation::Write(offset, v) => {
                let n = buf.max_index() + offset as i64;
                match buf.write(n, v) {
                    Ok(()) => {
                        if n >= 0 {
                            model[n as usize] = v;
                        }
                    }
                    Err(_) => assert!(!buf.contains(n)),
                }
            }
        }
        assert_eq!(buf.max_index() - buf.min_index() + 1, buf.capacity() as i64);
    }
});
