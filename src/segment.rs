//! Partition of the unit interval into per-symbol segments.

use crate::error::{Error, Result};
use crate::model::{ProbabilityModel, ALPHABET_SIZE, TOLERANCE};

/// Half-open sub-interval `[left, right)` owned by one symbol.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// The symbol this interval encodes.
    pub symbol: u8,
    /// Inclusive lower bound.
    pub left: f64,
    /// Exclusive upper bound.
    pub right: f64,
}

impl Segment {
    /// Width of the interval, equal to the symbol's probability up to drift.
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// True if `code` lies in `[left, right)`.
    pub fn contains(&self, code: f64) -> bool {
        self.left <= code && code < self.right
    }
}

/// Segments of every modeled symbol, contiguous and ascending by symbol.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentTable {
    segments: Vec<Segment>,
    /// symbol -> position in `segments`
    index: [Option<u8>; ALPHABET_SIZE],
}

impl SegmentTable {
    /// Lay out the model's symbols over `[0, 1)` in ascending symbol order.
    ///
    /// Each segment starts where the previous one ended; the last one is
    /// pinned to end at exactly 1.
    ///
    /// # Errors
    /// `Error::EmptyModel` for a model without symbols, and
    /// `Error::DegenerateSegment` if accumulated drift leaves a symbol with
    /// no room.
    pub fn derive(model: &ProbabilityModel) -> Result<Self> {
        if model.is_empty() {
            return Err(Error::EmptyModel);
        }
        let last = model.len() - 1;
        let mut segments = Vec::with_capacity(model.len());
        let mut index = [None; ALPHABET_SIZE];
        let mut left = 0.0;
        for (i, (symbol, p)) in model.iter().enumerate() {
            let right = if i == last { 1.0 } else { (left + p).min(1.0) };
            if right <= left {
                return Err(Error::DegenerateSegment { symbol });
            }
            index[symbol as usize] = Some(i as u8);
            segments.push(Segment {
                symbol,
                left,
                right,
            });
            left = right;
        }
        Ok(Self { segments, index })
    }

    /// Segment of `symbol`, if it is modeled.
    pub fn get(&self, symbol: u8) -> Option<&Segment> {
        self.index[symbol as usize].map(|i| &self.segments[i as usize])
    }

    /// The segment containing `code`.
    ///
    /// Codes up to `TOLERANCE` below 0 or at/above 1 resolve to the first or
    /// last segment, absorbing rounding from rescaling. Anything further out,
    /// or NaN, matches nothing.
    pub fn locate(&self, code: f64) -> Option<&Segment> {
        let first = self.segments.first()?;
        let last = self.segments.last()?;
        if code < first.left {
            return (code >= first.left - TOLERANCE).then_some(first);
        }
        if code >= last.right {
            return (code < last.right + TOLERANCE).then_some(last);
        }
        let i = self.segments.partition_point(|s| s.right <= code);
        self.segments.get(i).filter(|s| s.contains(code))
    }

    /// Segments in ascending symbol order.
    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True if the table has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn table(entries: &[(u8, f64)]) -> SegmentTable {
        let model = ProbabilityModel::from_probabilities(entries.iter().copied()).unwrap();
        SegmentTable::derive(&model).unwrap()
    }

    #[test]
    fn test_ascending_layout() {
        // Insertion order must not matter.
        let t = table(&[(b'C', 0.25), (b'A', 0.5), (b'B', 0.25)]);
        let layout: Vec<_> = t.iter().map(|s| (s.symbol, s.left, s.right)).collect();
        assert_eq!(
            layout,
            vec![(b'A', 0.0, 0.5), (b'B', 0.5, 0.75), (b'C', 0.75, 1.0)]
        );
    }

    #[test]
    fn test_get_and_locate() {
        let t = table(&[(b'A', 0.5), (b'B', 0.5)]);
        assert_eq!(t.get(b'B').unwrap().left, 0.5);
        assert!(t.get(b'Z').is_none());
        assert_eq!(t.locate(0.0).unwrap().symbol, b'A');
        assert_eq!(t.locate(0.4999).unwrap().symbol, b'A');
        assert_eq!(t.locate(0.5).unwrap().symbol, b'B');
        assert_eq!(t.locate(0.99).unwrap().symbol, b'B');
    }

    #[test]
    fn test_locate_edges() {
        let t = table(&[(b'A', 0.5), (b'B', 0.5)]);
        assert_eq!(t.locate(1.0).unwrap().symbol, b'B');
        assert_eq!(t.locate(-1e-12).unwrap().symbol, b'A');
        assert!(t.locate(1.5).is_none());
        assert!(t.locate(-0.1).is_none());
        assert!(t.locate(f64::NAN).is_none());
    }

    #[test]
    fn test_single_symbol_is_whole_interval() {
        let t = table(&[(b'A', 1.0)]);
        let s = t.get(b'A').unwrap();
        assert_eq!((s.left, s.right), (0.0, 1.0));
    }

    proptest! {
        #[test]
        fn prop_partition(data in prop::collection::vec(any::<u8>(), 1..1024)) {
            let model = ProbabilityModel::from_bytes(&data).unwrap();
            let t = SegmentTable::derive(&model).unwrap();
            let segs: Vec<_> = t.iter().copied().collect();
            prop_assert_eq!(segs[0].left, 0.0);
            prop_assert_eq!(segs[segs.len() - 1].right, 1.0);
            for pair in segs.windows(2) {
                prop_assert!(pair[0].symbol < pair[1].symbol);
                prop_assert_eq!(pair[0].right, pair[1].left);
            }
            for s in &segs {
                prop_assert!(s.left < s.right);
                let p = model.probability(s.symbol).unwrap();
                prop_assert!((s.width() - p).abs() <= 1e-9);
            }
        }

        #[test]
        fn prop_deterministic(data in prop::collection::vec(any::<u8>(), 1..256)) {
            let model = ProbabilityModel::from_bytes(&data).unwrap();
            let a = SegmentTable::derive(&model).unwrap();
            let b = SegmentTable::derive(&model.clone()).unwrap();
            for (x, y) in a.iter().zip(b.iter()) {
                prop_assert_eq!(x.left.to_bits(), y.left.to_bits());
                prop_assert_eq!(x.right.to_bits(), y.right.to_bits());
            }
        }
    }
}
