use anyhow::{bail, Result};

/// Similarity backend the selector drives. Implemented over ORB + Hamming
/// matching for real frames, and over scripted lookups in tests so the
/// state machine is exercised without any I/O.
pub trait SimilarityModel {
    type Frame: Clone;
    type Features;

    fn extract(&mut self, frame: &Self::Frame) -> Result<Self::Features>;

    /// Confident-match count between the retained frame's features and the
    /// current frame's. Must return 0 when either side has no descriptors
    /// (no evidence of similarity reads as novelty).
    fn confident_matches(
        &mut self,
        retained: &Self::Features,
        current: &Self::Features,
    ) -> Result<usize>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    AwaitingFirstFrame,
    Streaming,
    Drained,
}

/// Outcome of offering one frame to the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted { index: usize },
    Rejected { confident: usize },
}

/// Greedy, causal, one-pass keyframe selection.
///
/// Holds exactly one retained feature set, always belonging to the most
/// recently accepted frame. Frames offered after the first are accepted
/// when their confident-match count against the retained set stays below
/// the cutoff; rejection leaves the retained set untouched. `finish`
/// flushes the most recently seen streaming frame unconditionally so the
/// output always spans to the end of the source.
pub struct KeyframeSelector<M: SimilarityModel> {
    model: M,
    cutoff: usize,
    state: SelectorState,
    retained: Option<M::Features>,
    last_seen: Option<M::Frame>,
    next_index: usize,
}

impl<M: SimilarityModel> KeyframeSelector<M> {
    pub fn new(model: M, cutoff: usize) -> Self {
        Self {
            model,
            cutoff,
            state: SelectorState::AwaitingFirstFrame,
            retained: None,
            last_seen: None,
            next_index: 0,
        }
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    /// Pure accept decision: below the cutoff means distinct enough.
    fn should_accept(confident: usize, cutoff: usize) -> bool {
        confident < cutoff
    }

    pub fn offer(&mut self, frame: &M::Frame) -> Result<Verdict> {
        match self.state {
            SelectorState::Drained => bail!("frame offered after the selector drained"),
            SelectorState::AwaitingFirstFrame => {
                // The first frame is always keyframe 0. It never becomes
                // last-seen, so a one-frame source yields exactly one entry.
                let features = self.model.extract(frame)?;
                self.retained = Some(features);
                self.state = SelectorState::Streaming;
                self.next_index = 1;
                Ok(Verdict::Accepted { index: 0 })
            }
            SelectorState::Streaming => {
                let features = self.model.extract(frame)?;
                let confident = match &self.retained {
                    Some(retained) => self.model.confident_matches(retained, &features)?,
                    None => 0,
                };
                self.last_seen = Some(frame.clone());

                if Self::should_accept(confident, self.cutoff) {
                    let index = self.next_index;
                    self.next_index += 1;
                    self.retained = Some(features);
                    Ok(Verdict::Accepted { index })
                } else {
                    Ok(Verdict::Rejected { confident })
                }
            }
        }
    }

    /// Source exhausted: flush the last-seen frame, accepted or not, as
    /// one final entry. Returns `None` when nothing is pending (source had
    /// zero or one frames).
    pub fn finish(&mut self) -> Option<(usize, M::Frame)> {
        self.state = SelectorState::Drained;
        let frame = self.last_seen.take()?;
        let index = self.next_index;
        self.next_index += 1;
        Some((index, frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Frames are plain ids; similarity comes from a scripted table keyed
    /// by (retained, current). Missing entries score 0 (novel).
    struct ScriptedModel {
        scores: HashMap<(u32, u32), usize>,
    }

    impl ScriptedModel {
        fn new(scores: &[((u32, u32), usize)]) -> Self {
            Self {
                scores: scores.iter().copied().collect(),
            }
        }
    }

    impl SimilarityModel for ScriptedModel {
        type Frame = u32;
        type Features = u32;

        fn extract(&mut self, frame: &u32) -> Result<u32> {
            Ok(*frame)
        }

        fn confident_matches(&mut self, retained: &u32, current: &u32) -> Result<usize> {
            Ok(self.scores.get(&(*retained, *current)).copied().unwrap_or(0))
        }
    }

    fn run(model: ScriptedModel, cutoff: usize, frames: &[u32]) -> Vec<(usize, u32)> {
        let mut selector = KeyframeSelector::new(model, cutoff);
        let mut out = Vec::new();
        for frame in frames {
            if let Verdict::Accepted { index } = selector.offer(frame).unwrap() {
                out.push((index, *frame));
            }
        }
        if let Some(flushed) = selector.finish() {
            out.push(flushed);
        }
        out
    }

    #[test]
    fn empty_source_yields_empty_sequence() {
        let mut selector = KeyframeSelector::new(ScriptedModel::new(&[]), 10);
        assert_eq!(selector.state(), SelectorState::AwaitingFirstFrame);
        assert!(selector.finish().is_none());
        assert_eq!(selector.state(), SelectorState::Drained);
    }

    #[test]
    fn single_frame_source_yields_one_entry() {
        let out = run(ScriptedModel::new(&[]), 10, &[7]);
        assert_eq!(out, vec![(0, 7)]);
    }

    #[test]
    fn first_frame_is_always_index_zero() {
        let out = run(ScriptedModel::new(&[((1, 2), 100)]), 10, &[1, 2]);
        assert_eq!(out[0], (0, 1));
    }

    #[test]
    fn duplicate_is_rejected_and_tail_is_flushed() {
        // Frame 2 duplicates frame 1; frame 3 still reads as similar to the
        // retained frame 1, so it only reaches the output via the flush.
        let model = ScriptedModel::new(&[((1, 2), 50), ((1, 3), 50)]);
        let out = run(model, 10, &[1, 2, 3]);
        assert_eq!(out, vec![(0, 1), (1, 3)]);
    }

    #[test]
    fn accepted_tail_frame_is_flushed_again() {
        // Literal reference behavior: the last seen frame is flushed even
        // when it was just accepted, under a fresh index.
        let out = run(ScriptedModel::new(&[]), 10, &[1, 2]);
        assert_eq!(out, vec![(0, 1), (1, 2), (2, 2)]);
    }

    #[test]
    fn rejection_keeps_retained_frame() {
        // Frame 3 is compared against the retained frame 1, not against the
        // rejected frame 2: the (2, 3) score must never be consulted.
        let model = ScriptedModel::new(&[((1, 2), 99), ((2, 3), 99)]);
        let out = run(model, 10, &[1, 2, 3]);
        assert_eq!(out, vec![(0, 1), (1, 3), (2, 3)]);
    }

    #[test]
    fn acceptance_replaces_retained_frame() {
        // Frame 2 is accepted, so frame 3 is scored against 2 and rejected.
        let model = ScriptedModel::new(&[((2, 3), 40)]);
        let out = run(model, 10, &[1, 2, 3]);
        assert_eq!(out, vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn output_indices_are_contiguous() {
        let model = ScriptedModel::new(&[((1, 2), 80), ((1, 4), 80)]);
        let out = run(model, 10, &[1, 2, 3, 4, 5]);
        let indices: Vec<usize> = out.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, (0..out.len()).collect::<Vec<_>>());
    }

    #[test]
    fn raising_cutoff_never_accepts_fewer_frames() {
        let scores = [
            ((1u32, 2u32), 5usize),
            ((1, 3), 15),
            ((1, 4), 25),
            ((2, 3), 15),
            ((2, 4), 25),
        ];
        let frames = [1, 2, 3, 4];
        let mut previous = 0;
        for cutoff in [1usize, 10, 20, 30] {
            let accepted = run(ScriptedModel::new(&scores), cutoff, &frames).len();
            assert!(accepted >= previous, "cutoff {cutoff} shrank the output");
            previous = accepted;
        }
    }

    #[test]
    fn offering_after_finish_is_an_error() {
        let mut selector = KeyframeSelector::new(ScriptedModel::new(&[]), 10);
        selector.offer(&1).unwrap();
        selector.finish();
        assert!(selector.offer(&2).is_err());
    }
}
