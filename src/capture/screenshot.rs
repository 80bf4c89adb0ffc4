//! Screen region capture using GDI.

use anyhow::{anyhow, Context, Result};
use image::{ImageBuffer, Rgba, RgbaImage};
use std::path::Path;

use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject, GetDC,
    GetDIBits, ReleaseDC, SelectObject, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS,
    HGDIOBJ, SRCCOPY,
};

use crate::region::Region;

/// Copies the given screen region into an RGBA image.
pub fn capture_region(region: &Region) -> Result<RgbaImage> {
    let width = region.width;
    let height = region.height;

    unsafe {
        let screen_dc = GetDC(HWND::default());
        if screen_dc.is_invalid() {
            return Err(anyhow!("Failed to get screen device context"));
        }

        let memory_dc = CreateCompatibleDC(screen_dc);
        let bitmap = CreateCompatibleBitmap(screen_dc, width, height);
        let previous = SelectObject(memory_dc, HGDIOBJ(bitmap.0));

        let blit = BitBlt(
            memory_dc,
            0,
            0,
            width,
            height,
            screen_dc,
            region.x,
            region.y,
            SRCCOPY,
        );

        // Top-down 32-bit BGRA rows
        let mut info = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width,
                biHeight: -height,
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut buffer = vec![0u8; (width as usize) * (height as usize) * 4];
        let lines = GetDIBits(
            memory_dc,
            bitmap,
            0,
            height as u32,
            Some(buffer.as_mut_ptr() as *mut _),
            &mut info,
            DIB_RGB_COLORS,
        );

        let _ = SelectObject(memory_dc, previous);
        let _ = DeleteObject(HGDIOBJ(bitmap.0));
        let _ = DeleteDC(memory_dc);
        let _ = ReleaseDC(HWND::default(), screen_dc);

        blit.context("BitBlt from screen failed")?;
        if lines == 0 {
            return Err(anyhow!("GetDIBits returned no scan lines"));
        }

        // BGRA -> RGBA
        for px in buffer.chunks_exact_mut(4) {
            px.swap(0, 2);
            px[3] = 255;
        }

        ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(width as u32, height as u32, buffer)
            .ok_or_else(|| anyhow!("Captured buffer does not match region size"))
    }
}

/// Captures the region and saves it as a PNG file.
pub fn capture_region_to_file(region: &Region, path: &Path) -> Result<()> {
    let img = capture_region(region)?;
    img.save(path)
        .with_context(|| format!("Failed to save capture to {}", path.display()))?;
    Ok(())
}
