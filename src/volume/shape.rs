//! Shape and N-dimensional index constructs.
//!
//! The NIfTI format has a hard dimensionality limit of 7. The [`Shape`]
//! type validates the lengths declared by a header and provides an
//! iterator over all indices in natural file-traversal order, which is
//! the order voxels appear on disk (the first axis varies fastest).
//!
//! [`Shape`]: ./struct.Shape.html

use crate::error::{NiftiError, Result};
use std::convert::TryFrom;

/// An N-dimensional index into a volume, with rank between 0 and 7.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub struct Idx {
    raw: [usize; 7],
    rank: usize,
}

impl Idx {
    /// An all-zero index of the given rank.
    pub fn zero(rank: usize) -> Self {
        Idx {
            raw: [0; 7],
            rank,
        }
    }

    /// The index position along the given axis, if within rank.
    pub fn get(&self, axis: usize) -> Option<usize> {
        self.as_ref().get(axis).copied()
    }
}

impl AsRef<[usize]> for Idx {
    fn as_ref(&self) -> &[usize] {
        &self.raw[..self.rank]
    }
}

impl AsMut<[usize]> for Idx {
    fn as_mut(&mut self) -> &mut [usize] {
        &mut self.raw[..self.rank]
    }
}

/// A validated volume shape.
#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Validate and create a new volume shape from the lengths declared
    /// by a header. Lengths must be non-negative and addressable.
    pub fn from_dims(dims: &[i64]) -> Result<Self> {
        if dims.len() > 7 {
            return Err(NiftiError::InvalidRank(dims.len() as i64));
        }
        let dims = dims
            .iter()
            .enumerate()
            .map(|(axis, &d)| {
                usize::try_from(d).map_err(|_| NiftiError::InvalidDimension(axis, d))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Shape { dims })
    }

    /// Retrieve the axis lengths.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Retrieve the rank of this shape (dimensionality).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Calculate the number of elements in this shape. A rank of zero
    /// holds a single element.
    pub fn element_count(&self) -> usize {
        self.dims.iter().product()
    }

    /// Provide an iterator traversing all indices of a volume with this
    /// shape, in natural file-traversal order (first axis fastest).
    pub fn index_iter(&self) -> ShapeIter {
        ShapeIter::new(self)
    }
}

/// An iterator of all indices in a multi-dimensional volume, in
/// natural file-traversal order.
#[derive(Debug, Clone)]
pub struct ShapeIter<'a> {
    shape: &'a Shape,
    state: IterState,
}

#[derive(Debug, Copy, Clone)]
enum IterState {
    First,
    Middle(Idx),
    Fused,
}

impl<'a> ShapeIter<'a> {
    fn new(shape: &'a Shape) -> Self {
        let state = if shape.dims().iter().any(|&d| d == 0) {
            IterState::Fused
        } else {
            IterState::First
        };
        ShapeIter { shape, state }
    }
}

impl<'a> Iterator for ShapeIter<'a> {
    type Item = Idx;

    fn next(&mut self) -> Option<Self::Item> {
        let (out, next_state) = match &mut self.state {
            IterState::First => {
                let out = Idx::zero(self.shape.rank());
                (Some(out), IterState::Middle(out))
            }
            IterState::Fused => (None, IterState::Fused),
            IterState::Middle(mut current) => {
                let mut good = false;
                for (c, s) in Iterator::zip(current.as_mut().iter_mut(), self.shape.dims().iter())
                {
                    if *c < *s - 1 {
                        *c += 1;
                        good = true;
                        break;
                    }
                    *c = 0;
                }
                if good {
                    (Some(current), IterState::Middle(current))
                } else {
                    (None, IterState::Fused)
                }
            }
        };
        self.state = next_state;
        out
    }
}
