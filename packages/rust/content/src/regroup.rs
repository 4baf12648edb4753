//! Merge runs of quoted lines into quote groups.

use qaharvest_shared::ContentBlock;

/// Replace every maximal run of `Quoted` blocks with one `QuotedGroup`.
///
/// All other blocks pass through untouched and in place. Groups are never
/// empty, and existing groups are never split or merged, so running this on
/// its own output is a no-op.
pub fn regroup(blocks: impl IntoIterator<Item = ContentBlock>) -> Vec<ContentBlock> {
    let (mut out, pending) = blocks.into_iter().fold(
        (Vec::new(), Vec::new()),
        |(mut out, mut pending), block| {
            match block {
                ContentBlock::Quoted { value } => pending.push(value),
                other => {
                    flush(&mut out, std::mem::take(&mut pending));
                    out.push(other);
                }
            }
            (out, pending)
        },
    );

    flush(&mut out, pending);
    out
}

fn flush(out: &mut Vec<ContentBlock>, lines: Vec<String>) {
    if !lines.is_empty() {
        out.push(ContentBlock::QuotedGroup { lines });
    }
}
