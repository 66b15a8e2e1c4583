//! Fast-marching inpainting (Telea).
//!
//! Masked pixels are filled in order of their distance from the mask
//! boundary. Each newly reached pixel takes a weighted mean of the already
//! known pixels within `radius`, weighted by direction, distance and level-set
//! proximity.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use image::{GrayImage, Rgb, RgbImage};

const FAR: f32 = 1.0e6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flag {
    Known,
    Band,
    Inside,
}

#[derive(Debug, Clone, Copy)]
struct Narrow {
    t: f32,
    idx: usize,
}

impl PartialEq for Narrow {
    fn eq(&self, other: &Self) -> bool {
        self.t.total_cmp(&other.t) == Ordering::Equal && self.idx == other.idx
    }
}

impl Eq for Narrow {}

impl Ord for Narrow {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; smallest arrival time first.
        other
            .t
            .total_cmp(&self.t)
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

impl PartialOrd for Narrow {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reconstruct every pixel of `image` where `mask` is non-zero.
///
/// The mask must have the image's dimensions; a mismatched mask leaves the
/// image untouched.
pub fn inpaint_telea(image: &RgbImage, mask: &GrayImage, radius: f32) -> RgbImage {
    if image.dimensions() != mask.dimensions() {
        return image.clone();
    }
    let mut state = Marcher::new(image, mask, radius);
    state.run();
    state.into_image()
}

struct Marcher {
    width: usize,
    height: usize,
    range: isize,
    flags: Vec<Flag>,
    t: Vec<f32>,
    pixels: Vec<[f32; 3]>,
    heap: BinaryHeap<Narrow>,
}

impl Marcher {
    fn new(image: &RgbImage, mask: &GrayImage, radius: f32) -> Self {
        let (w, h) = (image.width() as usize, image.height() as usize);
        let mut flags = vec![Flag::Known; w * h];
        let mut t = vec![0.0f32; w * h];
        let pixels = image
            .pixels()
            .map(|p| [p[0] as f32, p[1] as f32, p[2] as f32])
            .collect();

        for (idx, m) in mask.pixels().enumerate() {
            if m[0] > 0 {
                flags[idx] = Flag::Inside;
                t[idx] = FAR;
            }
        }

        let mut heap = BinaryHeap::new();
        for idx in 0..w * h {
            if flags[idx] != Flag::Known {
                continue;
            }
            let touches_mask = neighbours4(idx, w, h).any(|n| flags[n] == Flag::Inside);
            if touches_mask {
                flags[idx] = Flag::Band;
                heap.push(Narrow { t: 0.0, idx });
            }
        }

        Self {
            width: w,
            height: h,
            range: radius.round().max(1.0) as isize,
            flags,
            t,
            pixels,
            heap,
        }
    }

    fn run(&mut self) {
        while let Some(Narrow { idx, .. }) = self.heap.pop() {
            self.flags[idx] = Flag::Known;
            let neighbours: Vec<usize> = neighbours4(idx, self.width, self.height).collect();
            for n in neighbours {
                if self.flags[n] == Flag::Known {
                    continue;
                }
                let arrival = self.arrival_time(n);
                if self.flags[n] == Flag::Inside {
                    self.flags[n] = Flag::Band;
                    self.t[n] = arrival;
                    self.pixels[n] = self.estimate(n);
                    self.heap.push(Narrow { t: arrival, idx: n });
                } else if arrival < self.t[n] {
                    self.t[n] = arrival;
                }
            }
        }
    }

    fn into_image(self) -> RgbImage {
        let w = self.width as u32;
        let pixels = self.pixels;
        RgbImage::from_fn(w, self.height as u32, |x, y| {
            let p = pixels[y as usize * w as usize + x as usize];
            Rgb(p.map(|c| c.round().clamp(0.0, 255.0) as u8))
        })
    }

    fn at(&self, x: isize, y: isize) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            None
        } else {
            Some(y as usize * self.width + x as usize)
        }
    }

    fn known_t(&self, idx: Option<usize>) -> Option<f32> {
        idx.filter(|&i| self.flags[i] == Flag::Known).map(|i| self.t[i])
    }

    /// Eikonal update from one horizontal and one vertical neighbour.
    fn solve(&self, a: Option<usize>, b: Option<usize>) -> f32 {
        match (self.known_t(a), self.known_t(b)) {
            (Some(t1), Some(t2)) => {
                let d = t1 - t2;
                let r_sq = 2.0 - d * d;
                if r_sq < 0.0 {
                    return 1.0 + t1.min(t2);
                }
                let r = r_sq.sqrt();
                let s = (t1 + t2 - r) / 2.0;
                if s >= t1 && s >= t2 {
                    s
                } else {
                    let s = s + r;
                    if s >= t1 && s >= t2 {
                        s
                    } else {
                        1.0 + t1.min(t2)
                    }
                }
            }
            (Some(t1), None) => 1.0 + t1,
            (None, Some(t2)) => 1.0 + t2,
            (None, None) => FAR,
        }
    }

    fn arrival_time(&self, idx: usize) -> f32 {
        let x = (idx % self.width) as isize;
        let y = (idx / self.width) as isize;
        let up = self.at(x, y - 1);
        let down = self.at(x, y + 1);
        let left = self.at(x - 1, y);
        let right = self.at(x + 1, y);
        self.solve(up, left)
            .min(self.solve(down, left))
            .min(self.solve(up, right))
            .min(self.solve(down, right))
    }

    fn gradient_t(&self, x: isize, y: isize) -> (f32, f32) {
        let t0 = self.t[y as usize * self.width + x as usize];
        let axis = |before: Option<usize>, after: Option<usize>| {
            let usable = |i: Option<usize>| i.filter(|&i| self.flags[i] != Flag::Inside);
            match (usable(before), usable(after)) {
                (Some(b), Some(a)) => (self.t[a] - self.t[b]) * 0.5,
                (None, Some(a)) => self.t[a] - t0,
                (Some(b), None) => t0 - self.t[b],
                (None, None) => 0.0,
            }
        };
        (
            axis(self.at(x - 1, y), self.at(x + 1, y)),
            axis(self.at(x, y - 1), self.at(x, y + 1)),
        )
    }

    fn estimate(&self, idx: usize) -> [f32; 3] {
        let x = (idx % self.width) as isize;
        let y = (idx / self.width) as isize;
        let (gx, gy) = self.gradient_t(x, y);
        let t0 = self.t[idx];
        let range_sq = (self.range * self.range) as f32;

        let mut sum = [0.0f32; 3];
        let mut total = 0.0f32;
        for qy in y - self.range..=y + self.range {
            for qx in x - self.range..=x + self.range {
                let Some(q) = self.at(qx, qy) else {
                    continue;
                };
                if q == idx || self.flags[q] == Flag::Inside {
                    continue;
                }
                let rx = (x - qx) as f32;
                let ry = (y - qy) as f32;
                let len_sq = rx * rx + ry * ry;
                if len_sq > range_sq {
                    continue;
                }
                let dst = 1.0 / (len_sq * len_sq.sqrt());
                let lev = 1.0 / (1.0 + (self.t[q] - t0).abs());
                let mut dir = rx * gx + ry * gy;
                if dir.abs() <= 0.01 {
                    dir = 1.0e-6;
                }
                let weight = (dst * lev * dir).abs();
                for (s, c) in sum.iter_mut().zip(self.pixels[q]) {
                    *s += weight * c;
                }
                total += weight;
            }
        }

        if total > 0.0 {
            sum.map(|s| s / total)
        } else {
            self.pixels[idx]
        }
    }
}

fn neighbours4(idx: usize, w: usize, h: usize) -> impl Iterator<Item = usize> {
    let x = idx % w;
    let y = idx / w;
    let up = (y > 0).then(|| idx - w);
    let down = (y + 1 < h).then(|| idx + w);
    let left = (x > 0).then(|| idx - 1);
    let right = (x + 1 < w).then(|| idx + 1);
    [up, down, left, right].into_iter().flatten()
}
