use std::collections::VecDeque;

use crate::error::SraMetaError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatePair {
    pub forward: String,
    pub reverse: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairResolution {
    pub pairs: Vec<MatePair>,
    /// Names dropped because they are not gzipped FASTQ.
    pub discarded: Vec<String>,
}

/// Presumed reverse-mate name: every `R1` becomes `R2`, or failing that every
/// `_1` becomes `_2`. Returns the input unchanged when neither occurs.
pub fn reverse_mate_name(forward: &str) -> String {
    let reverse = forward.replace("R1", "R2");
    if reverse != forward {
        return reverse;
    }
    forward.replace("_1", "_2")
}

fn is_gzipped_fastq(filename: &str) -> bool {
    filename
        .split_once('.')
        .map(|(_, extension)| extension == "fastq.gz")
        .unwrap_or(false)
}

/// Drains `filenames` into forward/reverse mate pairs.
///
/// The first remaining name is always the forward read, so pairs come out in
/// first-seen order of their forward reads.
pub fn resolve_pairs<I, S>(filenames: I) -> Result<PairResolution, SraMetaError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut queue: VecDeque<String> = filenames.into_iter().map(Into::into).collect();
    let mut resolution = PairResolution::default();

    while let Some(forward) = queue.pop_front() {
        if !is_gzipped_fastq(&forward) {
            resolution.discarded.push(forward);
            continue;
        }
        let reverse = reverse_mate_name(&forward);
        let position = queue
            .iter()
            .position(|name| *name == reverse)
            .ok_or_else(|| SraMetaError::MissingMate {
                orphan: forward.clone(),
            })?;
        let reverse = queue
            .remove(position)
            .ok_or_else(|| SraMetaError::MissingMate {
                orphan: forward.clone(),
            })?;
        resolution.pairs.push(MatePair { forward, reverse });
    }

    Ok(resolution)
}
