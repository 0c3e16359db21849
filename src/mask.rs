//! Binary segmentation masks and the two compositing operations the
//! annotation subcommands are built on: merging layers into one mask and
//! resolving overlaps in painter's order.
//!
//! A mask is a single-channel boolean raster. AnnoFab stores one mask per
//! segmentation annotation as a PNG whose resolution matches the task's
//! input image; within a frame, annotations are layered back-to-front in
//! the order the editor lists them.

use std::collections::{HashMap, HashSet};
use std::io::Cursor;

use image::{GrayImage, ImageFormat, Luma};

use crate::error::{Error, Result};

/// A boolean raster, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl Mask {
    /// All-false mask of the given shape.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![false; (width as usize) * (height as usize)],
        }
    }

    /// Build a mask from row-major pixel data. `data.len()` must equal
    /// `width * height`.
    pub fn from_pixels(width: u32, height: u32, data: Vec<bool>) -> Result<Self> {
        let expect = (width as usize) * (height as usize);
        if data.len() != expect {
            return Err(Error::invalid_argument(format!(
                "mask data length {} does not match {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.data[(y as usize) * (self.width as usize) + (x as usize)]
    }

    pub fn set(&mut self, x: u32, y: u32, v: bool) {
        self.data[(y as usize) * (self.width as usize) + (x as usize)] = v;
    }

    /// Number of foreground pixels.
    pub fn area(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Decode a PNG into a mask. Any pixel with non-zero luma is foreground.
    pub fn decode_png(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.into_luma8();
        let (width, height) = img.dimensions();
        let data = img.pixels().map(|p| p.0[0] != 0).collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Encode as an 8-bit grayscale PNG (255 foreground, 0 background).
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut img = GrayImage::new(self.width, self.height);
        for (i, &v) in self.data.iter().enumerate() {
            let x = (i % self.width as usize) as u32;
            let y = (i / self.width as usize) as u32;
            img.put_pixel(x, y, Luma([if v { 255 } else { 0 }]));
        }
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }
}

/// Elementwise logical OR of all masks.
///
/// Commutative and idempotent. Fails with `InvalidArgument` on an empty
/// list. Shapes are not checked; callers are expected to pass masks of one
/// frame, which share the input image's resolution.
pub fn merge(masks: &[Mask]) -> Result<Mask> {
    let (first, rest) = masks
        .split_first()
        .ok_or_else(|| Error::invalid_argument("cannot merge an empty list of masks"))?;
    let mut out = first.clone();
    for m in rest {
        for (d, s) in out.data.iter_mut().zip(&m.data) {
            *d |= *s;
        }
    }
    Ok(out)
}

/// Resolve overlaps between masks, topmost wins.
///
/// `order` lists annotation ids back to front. Each pixel ends up owned by
/// the front-most mask covering it; every output mask is the indicator of
/// the pixels its id owns. Outputs are pairwise disjoint and each is a
/// subset of its input.
///
/// Fails with `InvalidArgument` when the set of map keys differs from the
/// set of ids in `order` (duplicates in `order` are rejected too).
pub fn remove_overlap(
    masks: &HashMap<String, Mask>,
    order: &[String],
) -> Result<HashMap<String, Mask>> {
    let ids: HashSet<&str> = order.iter().map(String::as_str).collect();
    if ids.len() != order.len()
        || ids.len() != masks.len()
        || !masks.keys().all(|k| ids.contains(k.as_str()))
    {
        return Err(Error::invalid_argument(
            "ordering must contain exactly the annotation ids of the mask mapping",
        ));
    }
    let Some(front) = order.first().map(|id| &masks[id]) else {
        return Ok(HashMap::new());
    };
    let (width, height) = (front.width, front.height);
    let npix = front.data.len();

    // Owner raster: index into `order` of the front-most mask covering each
    // pixel. usize::MAX marks unowned pixels.
    let mut owner = vec![usize::MAX; npix];
    for (idx, id) in order.iter().enumerate() {
        for (o, &v) in owner.iter_mut().zip(&masks[id].data) {
            if v {
                *o = idx;
            }
        }
    }

    let mut out = HashMap::with_capacity(order.len());
    for (idx, id) in order.iter().enumerate() {
        let data = owner.iter().map(|&o| o == idx).collect();
        out.insert(
            id.clone(),
            Mask {
                width,
                height,
                data,
            },
        );
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    fn mask_of(points: &[(u32, u32)]) -> Mask {
        let data = (0..16u32).map(|i| points.contains(&(i % 4, i / 4))).collect();
        Mask::from_pixels(4, 4, data).unwrap()
    }

    #[test]
    fn merge_empty_list_is_invalid() {
        let err = merge(&[]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn merge_singleton_is_identity() {
        let a = mask_of(&[(0, 0), (2, 3)]);
        assert_eq!(merge(std::slice::from_ref(&a)).unwrap(), a);
    }

    #[test]
    fn merge_is_commutative() {
        let a = mask_of(&[(0, 0), (1, 1)]);
        let b = mask_of(&[(0, 0), (3, 2)]);
        let ab = merge(&[a.clone(), b.clone()]).unwrap();
        let ba = merge(&[b, a]).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn merge_is_idempotent() {
        let a = mask_of(&[(1, 2), (3, 3)]);
        assert_eq!(merge(&[a.clone(), a.clone()]).unwrap(), a);
    }

    #[test]
    fn merge_unions_pixels() {
        let a = mask_of(&[(0, 0)]);
        let b = mask_of(&[(1, 1)]);
        let m = merge(&[a, b]).unwrap();
        assert!(m.get(0, 0) && m.get(1, 1));
        assert_eq!(m.area(), 2);
    }

    #[test]
    fn overlap_topmost_wins() {
        // B is on top of A; pixel (0,0) is contested.
        let masks: HashMap<String, Mask> = [
            ("a".to_string(), mask_of(&[(0, 0), (1, 1)])),
            ("b".to_string(), mask_of(&[(0, 0)])),
        ]
        .into_iter()
        .collect();
        let order = vec!["a".to_string(), "b".to_string()];
        let out = remove_overlap(&masks, &order).unwrap();
        assert_eq!(out["a"], mask_of(&[(1, 1)]));
        assert_eq!(out["b"], mask_of(&[(0, 0)]));
    }

    #[test]
    fn overlap_disjoint_inputs_unchanged() {
        let masks: HashMap<String, Mask> = [
            ("a".to_string(), mask_of(&[(0, 0)])),
            ("b".to_string(), mask_of(&[(3, 3)])),
        ]
        .into_iter()
        .collect();
        let order = vec!["b".to_string(), "a".to_string()];
        let out = remove_overlap(&masks, &order).unwrap();
        assert_eq!(out, masks);
    }

    #[test]
    fn overlap_outputs_disjoint_under_any_ordering() {
        let masks: HashMap<String, Mask> = [
            ("a".to_string(), mask_of(&[(0, 0), (1, 1), (2, 2)])),
            ("b".to_string(), mask_of(&[(1, 1), (2, 2)])),
            ("c".to_string(), mask_of(&[(2, 2), (3, 3)])),
        ]
        .into_iter()
        .collect();
        let ids: Vec<String> = masks.keys().cloned().collect();
        for order in ids.iter().cloned().permutations(ids.len()) {
            let out = remove_overlap(&masks, &order).unwrap();
            for pair in out.values().combinations(2) {
                let (m1, m2) = (pair[0], pair[1]);
                for y in 0..4 {
                    for x in 0..4 {
                        assert!(!(m1.get(x, y) && m2.get(x, y)), "pixel ({x},{y}) owned twice");
                    }
                }
            }
            // Each output is a subset of its input.
            for (id, m) in &out {
                for y in 0..4 {
                    for x in 0..4 {
                        assert!(!m.get(x, y) || masks[id].get(x, y));
                    }
                }
            }
        }
    }

    #[test]
    fn overlap_rejects_mismatched_ids() {
        let masks: HashMap<String, Mask> =
            [("a".to_string(), mask_of(&[(0, 0)]))].into_iter().collect();
        let err = remove_overlap(&masks, &["b".to_string()]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = remove_overlap(&masks, &["a".to_string(), "a".to_string()]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn overlap_rejects_duplicate_id_hiding_a_missing_key() {
        // Lengths agree and every ordering id is a key, but "b" never
        // appears in the ordering: still an id-set mismatch.
        let masks: HashMap<String, Mask> = [
            ("a".to_string(), mask_of(&[(0, 0)])),
            ("b".to_string(), mask_of(&[(1, 1)])),
        ]
        .into_iter()
        .collect();
        let err = remove_overlap(&masks, &["a".to_string(), "a".to_string()]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn png_codec_preserves_pixels() {
        let m = mask_of(&[(0, 0), (2, 1), (3, 3)]);
        let bytes = m.encode_png().unwrap();
        assert_eq!(Mask::decode_png(&bytes).unwrap(), m);
    }

    #[test]
    fn from_pixels_checks_length() {
        let mut m = Mask::from_pixels(2, 2, vec![true, false, false, true]).unwrap();
        assert!(m.get(0, 0) && m.get(1, 1));
        m.set(0, 1, true);
        assert!(m.get(0, 1));
        assert!(Mask::from_pixels(2, 2, vec![true]).is_err());
    }
}
