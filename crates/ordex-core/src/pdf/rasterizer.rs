//! Page rasterization for scanned PDFs using lopdf.
//!
//! Scanned purchase orders carry one full-page image per page. The page
//! raster is the largest image XObject reachable from the page resources.

use image::{DynamicImage, GrayImage, ImageBuffer, Rgb};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace};

use super::{PageRasterizer, Result};
use crate::error::PdfError;

/// Rasterizer decoding embedded page images with lopdf.
pub struct LopdfRasterizer {
    document: Option<Document>,
}

impl LopdfRasterizer {
    /// Create a rasterizer with no document loaded.
    pub fn new() -> Self {
        Self { document: None }
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }

    /// All decodable images placed on a page.
    fn page_images(&self, doc: &Document, page_id: ObjectId) -> Vec<DynamicImage> {
        let mut images = Vec::new();

        let Some(resources) = page_resources(doc, page_id) else {
            return images;
        };
        let Ok(xobjects) = resources.get(b"XObject") else {
            return images;
        };
        if let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) {
            for (name, obj_ref) in xobj_dict.iter() {
                if let Ok((_, obj)) = doc.dereference(obj_ref) {
                    trace!("Inspecting XObject /{}", String::from_utf8_lossy(name));
                    if let Some(img) = decode_image_object(doc, obj) {
                        images.push(img);
                    }
                }
            }
        }

        images
    }
}

impl Default for LopdfRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageRasterizer for LopdfRasterizer {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Scanners often emit PDFs encrypted with an empty user password.
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn render_page(&self, page: u32) -> Result<DynamicImage> {
        let doc = self.document()?;
        let pages = doc.get_pages();
        let page_id = pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let images = self.page_images(doc, *page_id);
        debug!("Page {} has {} decodable images", page, images.len());

        images
            .into_iter()
            .max_by_key(|img| u64::from(img.width()) * u64::from(img.height()))
            .ok_or_else(|| {
                PdfError::ImageExtraction(format!("page {} has no decodable image", page))
            })
    }
}

/// Resources dictionary for a page, following inheritance from the page tree.
fn page_resources(doc: &Document, node_id: ObjectId) -> Option<Dictionary> {
    let Ok(Object::Dictionary(dict)) = doc.get_object(node_id) else {
        return None;
    };

    if let Ok(resources) = dict.get(b"Resources") {
        if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
            return Some(res_dict.clone());
        }
    }

    match dict.get(b"Parent") {
        Ok(Object::Reference(parent_id)) => page_resources(doc, *parent_id),
        _ => None,
    }
}

fn decode_image_object(doc: &Document, obj: &Object) -> Option<DynamicImage> {
    let Object::Stream(stream) = obj else {
        return None;
    };
    let dict = &stream.dict;

    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = image_dimension(dict, b"Width")?;
    let height = image_dimension(dict, b"Height")?;
    trace!("Found image object: {}x{}", width, height);

    let filter = dict.get(b"Filter").ok().and_then(|f| match f {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(arr) => arr.last().and_then(|o| o.as_name().ok()),
        _ => None,
    });

    match filter {
        Some(b"DCTDecode") => {
            trace!("Decoding JPEG image");
            return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                .ok();
        }
        Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
            trace!("Unsupported image filter {:?}", filter.map(String::from_utf8_lossy));
            return None;
        }
        _ => {}
    }

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| match o {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
            _ => None,
        })
        .unwrap_or(b"DeviceGray");

    let is_mask = dict
        .get(b"ImageMask")
        .ok()
        .and_then(|o| o.as_bool().ok())
        .unwrap_or(false);

    let bits = if is_mask {
        1
    } else {
        dict.get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8) as u8
    };

    decode_raw(&data, width, height, color_space, bits)
}

/// A strictly positive `/Width` or `/Height` that fits in `u32`.
fn image_dimension(dict: &Dictionary, key: &[u8]) -> Option<u32> {
    let value = dict.get(key).ok()?.as_i64().ok()?;
    u32::try_from(value).ok().filter(|&v| v > 0)
}

/// Decode uncompressed samples into an image.
fn decode_raw(
    data: &[u8],
    width: u32,
    height: u32,
    color_space: &[u8],
    bits_per_component: u8,
) -> Option<DynamicImage> {
    trace!(
        "Creating image from raw data: {}x{}, colorspace={:?}, bits={}",
        width,
        height,
        String::from_utf8_lossy(color_space),
        bits_per_component
    );

    let pixels = (width as usize).checked_mul(height as usize)?;
    let rgb_len = pixels.checked_mul(3)?;

    match (color_space, bits_per_component) {
        (b"DeviceRGB" | b"RGB", 8) if data.len() >= rgb_len => {
            ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, data[..rgb_len].to_vec())
                .map(DynamicImage::ImageRgb8)
        }
        (b"DeviceGray" | b"G", 8) if data.len() >= pixels => {
            GrayImage::from_raw(width, height, data[..pixels].to_vec())
                .map(DynamicImage::ImageLuma8)
        }
        (b"DeviceGray" | b"G", 1) => unpack_bilevel(data, width, height).map(DynamicImage::ImageLuma8),
        _ => {
            trace!(
                "Could not decode image: data_len={}, pixels={}",
                data.len(),
                pixels
            );
            None
        }
    }
}

/// Expand 1 bit per pixel rows (padded to whole bytes) to 8-bit gray.
fn unpack_bilevel(data: &[u8], width: u32, height: u32) -> Option<GrayImage> {
    if width == 0 || height == 0 {
        return None;
    }
    let row_bytes = (width as usize).div_ceil(8);
    if data.len() < row_bytes.checked_mul(height as usize)? {
        return None;
    }

    let mut gray = Vec::with_capacity((width as usize).checked_mul(height as usize)?);
    for row in data.chunks(row_bytes).take(height as usize) {
        for x in 0..width as usize {
            let bit = (row[x / 8] >> (7 - (x % 8))) & 1;
            gray.push(if bit == 1 { 255 } else { 0 });
        }
    }
    GrayImage::from_raw(width, height, gray)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    /// A PDF whose pages each hold one 8-bit gray image of `size` pixels.
    pub(crate) fn gray_pdf(pages: usize, size: (i64, i64)) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let pixels = (size.0 * size.1) as usize;

        let mut kids = Vec::new();
        for page in 0..pages {
            let samples = vec![(page * 40) as u8; pixels];
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => size.0,
                    "Height" => size.1,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8i64,
                },
                samples,
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Resources" => dictionary! {
                    "XObject" => dictionary! { "Im0" => image_id },
                },
                "MediaBox" => vec![0i64.into(), 0i64.into(), size.0.into(), size.1.into()],
            });
            kids.push(Object::Reference(page_id));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_render_embedded_pages() {
        let mut rasterizer = LopdfRasterizer::new();
        rasterizer.load(&gray_pdf(3, (4, 2))).unwrap();
        assert_eq!(rasterizer.page_count(), 3);

        let page = rasterizer.render_page(2).unwrap();
        assert_eq!((page.width(), page.height()), (4, 2));
        assert_eq!(page.to_luma8().get_pixel(0, 0)[0], 40);

        assert_eq!(rasterizer.render_pages(2).unwrap().len(), 2);
        assert_eq!(rasterizer.render_pages(0).unwrap().len(), 3);
        assert!(matches!(rasterizer.render_page(4), Err(PdfError::InvalidPage(4))));
    }

    #[test]
    fn test_rasterizer_new() {
        let rasterizer = LopdfRasterizer::new();
        assert!(rasterizer.document.is_none());
        assert_eq!(rasterizer.page_count(), 0);
        assert!(rasterizer.render_page(1).is_err());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let mut rasterizer = LopdfRasterizer::new();
        assert!(rasterizer.load(b"not a pdf").is_err());
    }

    #[test]
    fn test_decode_gray() {
        let img = decode_raw(&[0, 128, 255, 64], 2, 2, b"DeviceGray", 8).unwrap();
        let gray = img.to_luma8();
        assert_eq!(gray.get_pixel(1, 0)[0], 128);
        assert_eq!(gray.get_pixel(1, 1)[0], 64);
    }

    #[test]
    fn test_decode_rgb_short_data() {
        assert!(decode_raw(&[0; 5], 2, 1, b"DeviceRGB", 8).is_none());
    }

    #[test]
    fn test_degenerate_dimensions_are_rejected() {
        assert!(unpack_bilevel(&[], 0, 4).is_none());
        assert!(unpack_bilevel(&[0xff; 4], 8, 0).is_none());
        assert!(decode_raw(&[], 0, 0, b"DeviceGray", 1).is_none());
        assert!(decode_raw(&[0; 16], u32::MAX, u32::MAX, b"DeviceRGB", 8).is_none());

        let negative = dictionary! { "Width" => -4i64, "Height" => 0i64 };
        assert_eq!(image_dimension(&negative, b"Width"), None);
        assert_eq!(image_dimension(&negative, b"Height"), None);
        assert_eq!(image_dimension(&dictionary! { "Width" => 10i64 }, b"Width"), Some(10));
    }

    #[test]
    fn test_zero_width_mask_page_is_an_error() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 0i64,
                "Height" => 4i64,
                "ImageMask" => true,
            },
            Vec::new(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let mut rasterizer = LopdfRasterizer::new();
        rasterizer.load(&bytes).unwrap();
        assert!(matches!(
            rasterizer.render_page(1),
            Err(PdfError::ImageExtraction(_))
        ));
    }

    #[test]
    fn test_unpack_bilevel_padding() {
        // 10 pixels wide -> 2 bytes per row.
        let data = [0b1000_0000, 0b0100_0000, 0b0000_0001, 0b1100_0000];
        let img = unpack_bilevel(&data, 10, 2).unwrap();
        assert_eq!(img.get_pixel(0, 0)[0], 255);
        assert_eq!(img.get_pixel(1, 0)[0], 0);
        assert_eq!(img.get_pixel(9, 0)[0], 255);
        assert_eq!(img.get_pixel(7, 1)[0], 255);
        assert_eq!(img.get_pixel(8, 1)[0], 255);
        assert_eq!(img.get_pixel(9, 1)[0], 255);
        assert_eq!(img.get_pixel(0, 1)[0], 0);
    }
}
