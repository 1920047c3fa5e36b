//! Word-level alignment of two token sequences
//!
//! Tokens are compared by their text only. The edit script comes from a
//! Myers diff over the two text projections and is decomposed into
//! equal/replace/delete/insert opcodes. Each opcode is then expanded into
//! paired slots where a missing token on either side is a gap (`None`).

use std::ops::Range;

use similar::{Algorithm, DiffTag, capture_diff_slices};

use super::types::Token;

/// Kind of an edit-script span
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpTag {
    Equal,
    Replace,
    Delete,
    Insert,
}

/// Span of the edit script: `left` indexes side A, `right` side B
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Opcode {
    pub tag: OpTag,
    pub left: Range<usize>,
    pub right: Range<usize>,
}

/// Two equal-length token sequences with gaps
#[derive(Clone, Debug, Default)]
pub struct Alignment<'a> {
    pub left: Vec<Option<&'a Token>>,
    pub right: Vec<Option<&'a Token>>,
    pub opcodes: Vec<Opcode>,
}

impl<'a> Alignment<'a> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.left.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Aligned positions as `(side A, side B)` pairs
    pub fn pairs(&self) -> impl Iterator<Item = (Option<&'a Token>, Option<&'a Token>)> + '_ {
        self.left.iter().copied().zip(self.right.iter().copied())
    }

    /// True when every opcode is `Equal`
    #[must_use]
    pub fn is_identical(&self) -> bool {
        self.opcodes.iter().all(|op| op.tag == OpTag::Equal)
    }
}

/// Edit script between the text projections of `a` and `b`
#[must_use]
pub fn opcodes(a: &[Token], b: &[Token]) -> Vec<Opcode> {
    let left: Vec<&str> = a.iter().map(|t| t.text.as_str()).collect();
    let right: Vec<&str> = b.iter().map(|t| t.text.as_str()).collect();

    capture_diff_slices(Algorithm::Myers, &left, &right)
        .iter()
        .map(|op| {
            let (tag, left, right) = op.as_tag_tuple();
            let tag = match tag {
                DiffTag::Equal => OpTag::Equal,
                DiffTag::Replace => OpTag::Replace,
                DiffTag::Delete => OpTag::Delete,
                DiffTag::Insert => OpTag::Insert,
            };
            Opcode { tag, left, right }
        })
        .collect()
}

/// Align two token sequences.
///
/// Removing the gaps from `left` gives back `a` and removing them from
/// `right` gives back `b`. In a replace span the shorter side is padded
/// with gaps on the right.
#[must_use]
pub fn align<'a>(a: &'a [Token], b: &'a [Token]) -> Alignment<'a> {
    let opcodes = opcodes(a, b);
    let mut left = Vec::with_capacity(a.len().max(b.len()));
    let mut right = Vec::with_capacity(a.len().max(b.len()));

    for op in &opcodes {
        let span = op.left.len().max(op.right.len());
        let lhs = &a[op.left.clone()];
        let rhs = &b[op.right.clone()];
        for i in 0..span {
            left.push(lhs.get(i));
            right.push(rhs.get(i));
        }
    }

    Alignment {
        left,
        right,
        opcodes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::types::BBox;

    fn words(texts: &[&str]) -> Vec<Token> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Token::new(*t, BBox::new(i as f32, 0.0, i as f32 + 1.0, 1.0), 0))
            .collect()
    }

    fn texts(side: &[Option<&Token>]) -> Vec<Option<String>> {
        side.iter().map(|t| t.map(|t| t.text.clone())).collect()
    }

    fn some(texts: &[&str]) -> Vec<Option<String>> {
        texts.iter().map(|t| Some((*t).to_string())).collect()
    }

    #[test]
    fn test_single_replacement() {
        let a = words(&["foo", "bar"]);
        let b = words(&["foo", "baz"]);
        let alignment = align(&a, &b);

        assert_eq!(
            alignment.opcodes,
            vec![
                Opcode {
                    tag: OpTag::Equal,
                    left: 0..1,
                    right: 0..1
                },
                Opcode {
                    tag: OpTag::Replace,
                    left: 1..2,
                    right: 1..2
                },
            ]
        );
        assert_eq!(texts(&alignment.left), some(&["foo", "bar"]));
        assert_eq!(texts(&alignment.right), some(&["foo", "baz"]));
        assert!(!alignment.is_identical());
    }

    #[test]
    fn test_deletion_against_empty() {
        let a = words(&["x"]);
        let b = words(&[]);
        let alignment = align(&a, &b);

        assert_eq!(texts(&alignment.left), some(&["x"]));
        assert_eq!(alignment.right, vec![None]);
        assert_eq!(alignment.opcodes[0].tag, OpTag::Delete);
    }

    #[test]
    fn test_insertion_pads_left() {
        let a = words(&["a", "c"]);
        let b = words(&["a", "b", "c"]);
        let alignment = align(&a, &b);

        assert_eq!(
            texts(&alignment.left),
            vec![Some("a".into()), None, Some("c".into())]
        );
        assert_eq!(texts(&alignment.right), some(&["a", "b", "c"]));
    }

    #[test]
    fn test_uneven_replace_pads_shorter_side_on_right() {
        let a = words(&["start", "one", "end"]);
        let b = words(&["start", "two", "three", "four", "end"]);
        let alignment = align(&a, &b);

        assert_eq!(
            texts(&alignment.left),
            vec![
                Some("start".into()),
                Some("one".into()),
                None,
                None,
                Some("end".into())
            ]
        );
        assert_eq!(
            texts(&alignment.right),
            some(&["start", "two", "three", "four", "end"])
        );
    }

    #[test]
    fn test_identical_inputs_are_all_equal() {
        let a = words(&["the", "quick", "brown", "fox"]);
        let b = a.clone();
        let alignment = align(&a, &b);

        assert!(alignment.is_identical());
        assert!(alignment.pairs().all(|(l, r)| l.is_some() && r.is_some()));
    }

    #[test]
    fn test_empty_inputs() {
        let alignment = align(&[], &[]);
        assert!(alignment.is_empty());
        assert!(alignment.opcodes.is_empty());
        assert!(alignment.is_identical());
    }

    #[test]
    fn test_alignment_ignores_geometry() {
        let a = vec![Token::new("same", BBox::new(0.0, 0.0, 1.0, 1.0), 0)];
        let b = vec![Token::new("same", BBox::new(50.0, 50.0, 90.0, 60.0), 3)];
        assert!(align(&a, &b).is_identical());
    }

    #[test]
    fn test_aligned_tokens_keep_identity() {
        let a = words(&["p", "q"]);
        let b = words(&["q"]);
        let alignment = align(&a, &b);
        let kept: Vec<&Token> = alignment.left.iter().flatten().copied().collect();
        assert!(std::ptr::eq(kept[0], &a[0]));
        assert!(std::ptr::eq(kept[1], &a[1]));
    }
}
