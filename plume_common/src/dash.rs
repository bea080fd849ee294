// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Splitting flattened paths into dashes.

use smallvec::SmallVec;

use crate::flatten::Callback;
use crate::kurbo::Point;
use crate::path::PathEl;

/// Walks a flattened path and emits only the "on" parts of a dash pattern.
///
/// Every contour restarts the pattern at the position selected by the offset.
#[derive(Debug, Clone)]
pub struct Dasher {
    dashes: SmallVec<[f64; 4]>,
    start_phase: f64,
    start_index: usize,
    start_toggle: bool,
    phase: f64,
    index: usize,
    toggle: bool,
    current: Point,
}

impl Dasher {
    /// Create a dasher, or `None` if the pattern would leave the path unchanged.
    ///
    /// That is the case for an empty pattern, a pattern summing to zero, or a pattern with
    /// negative or non-finite entries.
    pub fn new(offset: f64, dashes: &[f64]) -> Option<Self> {
        if dashes.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return None;
        }
        let mut sum: f64 = dashes.iter().sum();
        // An odd pattern repeats twice with the toggles swapped.
        if dashes.len() % 2 == 1 {
            sum *= 2.0;
        }
        if sum <= 0.0 {
            return None;
        }

        let mut start_phase = if offset.is_finite() { offset % sum } else { 0.0 };
        if start_phase < 0.0 {
            start_phase += sum;
        }
        let mut start_index = 0;
        let mut start_toggle = true;
        while start_phase > 0.0 && start_phase >= dashes[start_index] {
            start_phase -= dashes[start_index];
            start_toggle = !start_toggle;
            start_index = (start_index + 1) % dashes.len();
        }

        Some(Self {
            dashes: dashes.into(),
            start_phase,
            start_index,
            start_toggle,
            phase: start_phase,
            index: start_index,
            toggle: start_toggle,
            current: Point::ZERO,
        })
    }

    /// Adapt `inner` so that it receives the dashed version of the elements it is given.
    pub fn wrap<C: Callback>(&mut self, inner: C) -> Dashed<'_, C> {
        Dashed { dasher: self, inner }
    }

    /// Process one flattened element.
    pub fn dash(&mut self, el: PathEl, out: &mut impl Callback) {
        let p1 = match el {
            PathEl::MoveTo(p) => {
                if self.start_toggle {
                    out.callback(PathEl::MoveTo(p));
                }
                self.current = p;
                self.phase = self.start_phase;
                self.index = self.start_index;
                self.toggle = self.start_toggle;
                return;
            }
            PathEl::LineTo(p) | PathEl::Close(p) => p,
            PathEl::CubicTo(..) => {
                debug_assert!(false, "dasher expects a flattened path");
                el.end_point()
            }
        };

        let p0 = self.current;
        let delta = p1 - p0;
        let dist0 = delta.hypot();
        let mut dist1 = 0.0;
        while dist0 - dist1 > self.dashes[self.index] - self.phase {
            dist1 += self.dashes[self.index] - self.phase;
            let p = p0 + delta * (dist1 / dist0);
            out.callback(if self.toggle {
                PathEl::LineTo(p)
            } else {
                PathEl::MoveTo(p)
            });
            self.phase = 0.0;
            self.toggle = !self.toggle;
            self.index = (self.index + 1) % self.dashes.len();
        }
        if self.toggle {
            out.callback(PathEl::LineTo(p1));
        }
        self.phase += dist0 - dist1;
        self.current = p1;
    }
}

/// A [`Callback`] that dashes everything it receives before forwarding it.
pub struct Dashed<'a, C> {
    dasher: &'a mut Dasher,
    inner: C,
}

impl<C: Callback> Callback for Dashed<'_, C> {
    fn callback(&mut self, el: PathEl) {
        self.dasher.dash(el, &mut self.inner);
    }
}
