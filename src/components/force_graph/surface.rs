use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

/// The subset of a 2D drawing context the renderer needs.
///
/// Fallible primitives return `false` on failure; callers skip the shape
/// and carry on with the frame.
pub trait Surface {
	type Image;

	fn save(&self);
	fn restore(&self);
	fn translate(&self, x: f64, y: f64);
	fn scale(&self, k: f64);

	fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64);
	fn begin_path(&self);
	fn move_to(&self, x: f64, y: f64);
	fn line_to(&self, x: f64, y: f64);
	fn close_path(&self);
	fn arc(&self, x: f64, y: f64, radius: f64) -> bool;
	fn clip(&self);
	fn fill(&self);
	fn stroke(&self);

	fn set_fill_style(&self, style: &str);
	fn set_stroke_style(&self, style: &str);
	fn set_line_width(&self, width: f64);
	fn set_font(&self, font: &str);

	fn fill_text(&self, text: &str, x: f64, y: f64) -> bool;
	fn measure_text(&self, text: &str) -> f64;
	fn draw_image(&self, image: &Self::Image, x: f64, y: f64, w: f64, h: f64) -> bool;
}

impl Surface for CanvasRenderingContext2d {
	type Image = HtmlImageElement;

	fn save(&self) {
		CanvasRenderingContext2d::save(self);
	}

	fn restore(&self) {
		CanvasRenderingContext2d::restore(self);
	}

	fn translate(&self, x: f64, y: f64) {
		let _ = CanvasRenderingContext2d::translate(self, x, y);
	}

	fn scale(&self, k: f64) {
		let _ = CanvasRenderingContext2d::scale(self, k, k);
	}

	fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64) {
		CanvasRenderingContext2d::fill_rect(self, x, y, w, h);
	}

	fn begin_path(&self) {
		CanvasRenderingContext2d::begin_path(self);
	}

	fn move_to(&self, x: f64, y: f64) {
		CanvasRenderingContext2d::move_to(self, x, y);
	}

	fn line_to(&self, x: f64, y: f64) {
		CanvasRenderingContext2d::line_to(self, x, y);
	}

	fn close_path(&self) {
		CanvasRenderingContext2d::close_path(self);
	}

	fn arc(&self, x: f64, y: f64, radius: f64) -> bool {
		CanvasRenderingContext2d::arc(self, x, y, radius, 0.0, 2.0 * std::f64::consts::PI).is_ok()
	}

	fn clip(&self) {
		CanvasRenderingContext2d::clip(self);
	}

	fn fill(&self) {
		CanvasRenderingContext2d::fill(self);
	}

	fn stroke(&self) {
		CanvasRenderingContext2d::stroke(self);
	}

	fn set_fill_style(&self, style: &str) {
		self.set_fill_style_str(style);
	}

	fn set_stroke_style(&self, style: &str) {
		self.set_stroke_style_str(style);
	}

	fn set_line_width(&self, width: f64) {
		CanvasRenderingContext2d::set_line_width(self, width);
	}

	fn set_font(&self, font: &str) {
		CanvasRenderingContext2d::set_font(self, font);
	}

	fn fill_text(&self, text: &str, x: f64, y: f64) -> bool {
		CanvasRenderingContext2d::fill_text(self, text, x, y).is_ok()
	}

	fn measure_text(&self, text: &str) -> f64 {
		CanvasRenderingContext2d::measure_text(self, text)
			.map(|m| m.width())
			.unwrap_or(0.0)
	}

	fn draw_image(&self, image: &HtmlImageElement, x: f64, y: f64, w: f64, h: f64) -> bool {
		self.draw_image_with_html_image_element_and_dw_and_dh(image, x, y, w, h)
			.is_ok()
	}
}
