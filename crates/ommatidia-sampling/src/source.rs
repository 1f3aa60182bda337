// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Named, already-decoded intensity images

use std::collections::BTreeMap;

use image::{DynamicImage, GrayImage};
use ndarray::Array2;

use crate::error::{SamplingError, SamplingResult};

/// A set of named 2-D intensity arrays, e.g. the variables of a matrix file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageSource {
    fields: BTreeMap<String, Array2<f64>>,
}

impl ImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source holding a single field
    pub fn single(name: impl Into<String>, image: Array2<f64>) -> Self {
        Self::new().with_field(name, image)
    }

    pub fn with_field(mut self, name: impl Into<String>, image: Array2<f64>) -> Self {
        self.insert(name, image);
        self
    }

    /// Returns the replaced image when `name` already existed
    pub fn insert(&mut self, name: impl Into<String>, image: Array2<f64>) -> Option<Array2<f64>> {
        self.fields.insert(name.into(), image)
    }

    pub fn field(&self, name: &str) -> SamplingResult<&Array2<f64>> {
        self.fields.get(name).ok_or_else(|| SamplingError::MissingField {
            field: name.to_string(),
            available: self.names().map(str::to_string).collect(),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Luma buffer as a `height x width` array, one value per pixel
pub fn gray_to_array(image: &GrayImage) -> Array2<f64> {
    let (width, height) = image.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
        image.get_pixel(col as u32, row as u32).0[0] as f64
    })
}

/// Converts to luma first
pub fn dynamic_to_array(image: &DynamicImage) -> Array2<f64> {
    gray_to_array(&image.to_luma8())
}

impl From<(&str, &GrayImage)> for ImageSource {
    fn from((name, image): (&str, &GrayImage)) -> Self {
        ImageSource::single(name, gray_to_array(image))
    }
}

impl From<(&str, &DynamicImage)> for ImageSource {
    fn from((name, image): (&str, &DynamicImage)) -> Self {
        ImageSource::single(name, dynamic_to_array(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_missing_field_lists_available() {
        let source = ImageSource::new()
            .with_field("im", Array2::zeros((2, 2)))
            .with_field("mask", Array2::zeros((2, 2)));
        let err = source.field("image").unwrap_err();
        assert_eq!(
            err,
            SamplingError::MissingField {
                field: "image".to_string(),
                available: vec!["im".to_string(), "mask".to_string()],
            }
        );
        assert!(err.to_string().contains("available: [im, mask]"));
    }

    #[test]
    fn test_gray_image_layout() {
        let mut gray = GrayImage::new(3, 2);
        gray.put_pixel(2, 1, Luma([200]));
        let array = gray_to_array(&gray);
        assert_eq!(array.dim(), (2, 3));
        assert_eq!(array[(1, 2)], 200.0);
        assert_eq!(array[(0, 0)], 0.0);
    }

    #[test]
    fn test_dynamic_image_source() {
        let gray = GrayImage::from_pixel(4, 4, Luma([10]));
        let source = ImageSource::from(("im", &DynamicImage::ImageLuma8(gray)));
        assert_eq!(source.field("im").unwrap().sum(), 160.0);
    }
}
