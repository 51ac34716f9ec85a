//! Multi-up PDF invoice generator: four tax invoices per A4 page in a 2×2
//! grid, one cell per eligible order of the selected day. The drawing
//! primitives come from `printpdf`; this module owns only the layout.

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Polygon,
    Rgb,
};

use crate::api::orders::Order;
use crate::error::{AdminError, Result};

// Page and cell geometry, all in millimetres
const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;
const INVOICE_WIDTH: f64 = 95.0;
const INVOICE_HEIGHT: f64 = 135.0;
const MARGIN_X: f64 = 7.5;
const MARGIN_Y: f64 = 10.0;
const GAP_X: f64 = 5.0;
const GAP_Y: f64 = 7.0;
/// Invoices per page (2×2 grid)
pub const SLOTS_PER_PAGE: usize = 4;

const PT_TO_MM: f64 = 0.352_778;
/// Average Helvetica glyph width as a fraction of the font size. Good enough
/// for wrapping and right-alignment of short invoice strings.
const AVG_GLYPH_EM: f64 = 0.5;

/// Top-left corner of the grid slot for the n-th invoice on its page
pub fn slot_position(index: usize) -> (f64, f64) {
    match index % SLOTS_PER_PAGE {
        0 => (MARGIN_X, MARGIN_Y),
        1 => (MARGIN_X + INVOICE_WIDTH + GAP_X, MARGIN_Y),
        2 => (MARGIN_X, MARGIN_Y + INVOICE_HEIGHT + GAP_Y),
        _ => (
            MARGIN_X + INVOICE_WIDTH + GAP_X,
            MARGIN_Y + INVOICE_HEIGHT + GAP_Y,
        ),
    }
}

/// Orders that get an invoice: placed on the selected day, not cancelled,
/// sorted ascending by creation time.
pub fn eligible_orders<'a>(orders: &'a [Order], date: NaiveDate) -> Vec<&'a Order> {
    let mut eligible: Vec<&Order> = orders
        .iter()
        .filter(|order| !order.is_cancelled())
        .filter(|order| {
            order
                .created_at
                .map(|dt| dt.date_naive() == date)
                .unwrap_or(false)
        })
        .collect();
    eligible.sort_by_key(|order| order.created_at);
    eligible
}

fn text_width_mm(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * AVG_GLYPH_EM * PT_TO_MM
}

/// Greedy word wrap against the estimated glyph width
pub fn wrap_text(text: &str, font_size: f64, max_width_mm: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if text_width_mm(&candidate, font_size) <= max_width_mm || current.is_empty() {
            current = candidate;
        } else {
            lines.push(current);
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Thousands-grouped amount with two decimals, e.g. `12,499.00`
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    let digits: Vec<char> = whole.chars().collect();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

/// Amount for the totals block: integer when whole, two decimals otherwise
fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{}", amount as i64)
    } else {
        format!("{:.2}", amount)
    }
}

/// `dd-mm-yyyy h:MM AM/PM`, the order screens' date format
pub fn format_order_datetime(dt: Option<DateTime<Utc>>) -> String {
    match dt {
        None => "N/A".to_string(),
        Some(dt) => {
            let (is_pm, hour) = dt.hour12();
            format!(
                "{} {}:{:02} {}",
                dt.format("%d-%m-%Y"),
                hour,
                dt.minute(),
                if is_pm { "PM" } else { "AM" }
            )
        }
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

/// Drawing helpers working in top-down millimetre coordinates
struct Painter<'a> {
    layer: &'a PdfLayerReference,
    fonts: &'a Fonts,
}

impl Painter<'_> {
    fn baseline(y_top: f64) -> Mm {
        Mm((PAGE_HEIGHT - y_top) as f32)
    }

    fn text(&self, text: &str, size: f64, x: f64, y_top: f64, font: &IndirectFontRef) {
        self.layer
            .use_text(text, size as f32, Mm(x as f32), Self::baseline(y_top), font);
    }

    fn text_right(&self, text: &str, size: f64, x_right: f64, y_top: f64, font: &IndirectFontRef) {
        let x = x_right - text_width_mm(text, size);
        self.text(text, size, x, y_top, font);
    }

    fn text_center(&self, text: &str, size: f64, x_center: f64, y_top: f64, font: &IndirectFontRef) {
        let x = x_center - text_width_mm(text, size) / 2.0;
        self.text(text, size, x, y_top, font);
    }

    fn hline(&self, x1: f64, x2: f64, y_top: f64, thickness: f64) {
        self.layer.set_outline_thickness(thickness as f32);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1 as f32), Self::baseline(y_top)), false),
                (Point::new(Mm(x2 as f32), Self::baseline(y_top)), false),
            ],
            is_closed: false,
        });
    }

    fn rect_outline(&self, x: f64, y_top: f64, width: f64, height: f64, thickness: f64) {
        self.layer.set_outline_thickness(thickness as f32);
        self.layer.add_line(Line {
            points: rect_points(x, y_top, width, height),
            is_closed: true,
        });
    }

    fn rect_filled(&self, x: f64, y_top: f64, width: f64, height: f64, color: Color) {
        self.layer.set_fill_color(color);
        self.layer.add_polygon(Polygon {
            rings: vec![rect_points(x, y_top, width, height)],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
        // Back to black for subsequent text
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    }
}

fn rect_points(x: f64, y_top: f64, width: f64, height: f64) -> Vec<(Point, bool)> {
    vec![
        (Point::new(Mm(x as f32), Painter::baseline(y_top)), false),
        (
            Point::new(Mm((x + width) as f32), Painter::baseline(y_top)),
            false,
        ),
        (
            Point::new(Mm((x + width) as f32), Painter::baseline(y_top + height)),
            false,
        ),
        (
            Point::new(Mm(x as f32), Painter::baseline(y_top + height)),
            false,
        ),
    ]
}

/// Render one invoice cell at (x, y)
fn draw_invoice(painter: &Painter<'_>, x: f64, y: f64, order: &Order) {
    let fonts = painter.fonts;
    let lx = x + 3.0;
    let rx = x + INVOICE_WIDTH - 3.0;
    let mut cy = y + 5.0;

    // Column anchors for the product table
    let col_product_x = lx;
    let col_qty_x = x + INVOICE_WIDTH - 42.0;
    let col_price_x = x + INVOICE_WIDTH - 20.0;
    let col_subtotal_x = x + INVOICE_WIDTH - 5.0;

    painter.rect_outline(x, y, INVOICE_WIDTH, INVOICE_HEIGHT, 0.5);

    painter.text_center("TAX INVOICE", 12.0, x + INVOICE_WIDTH / 2.0, cy, &fonts.bold);
    cy += 6.0;
    painter.hline(lx, rx, cy, 0.3);
    cy += 5.0;

    // Customer block
    painter.text("Customer Details", 8.0, lx, cy, &fonts.bold);
    cy += 4.0;
    painter.text(&order.customer_name(), 9.0, lx, cy, &fonts.bold);
    cy += 4.0;

    let address = order.address.clone().unwrap_or_default();
    painter.text(
        &format!("Mobile: {}", address.mobile.as_deref().unwrap_or("N/A")),
        8.0,
        lx,
        cy,
        &fonts.regular,
    );
    cy += 4.0;
    painter.text(
        &format!("Email : {}", address.email.as_deref().unwrap_or("N/A")),
        8.0,
        lx,
        cy,
        &fonts.regular,
    );
    cy += 4.0;

    let full_address = format!(
        "{}, {}, {}, {} - {}",
        address.address.as_deref().unwrap_or(""),
        address.area.as_deref().unwrap_or(""),
        address.city.as_deref().unwrap_or(""),
        address.state.as_deref().unwrap_or(""),
        address.postal.as_deref().unwrap_or(""),
    );
    let address_lines = wrap_text(&full_address, 8.0, INVOICE_WIDTH - 6.0);
    for line in &address_lines {
        painter.text(line, 8.0, lx, cy, &fonts.regular);
        cy += 3.5;
    }
    cy += 3.0;
    painter.hline(lx, rx, cy, 0.3);
    cy += 4.0;

    // Order block
    painter.text("Order Details", 8.0, lx, cy, &fonts.bold);
    cy += 4.0;
    painter.text(
        &format!("Order ID: {}", order.order_id.as_deref().unwrap_or("N/A")),
        7.0,
        lx,
        cy,
        &fonts.regular,
    );
    cy += 3.5;
    painter.text(
        &format!("Order Date: {}", format_order_datetime(order.created_at)),
        7.0,
        lx,
        cy,
        &fonts.regular,
    );
    cy += 3.5;
    painter.text(
        &format!("Payment: {}", order.payment_method.as_deref().unwrap_or("N/A")),
        7.0,
        lx,
        cy,
        &fonts.regular,
    );
    cy += 3.5;
    painter.hline(lx, rx, cy, 0.3);
    cy += 4.0;

    // Product table
    painter.text("Product", 7.0, col_product_x, cy, &fonts.bold);
    painter.text_right("Qty", 7.0, col_qty_x, cy, &fonts.bold);
    painter.text_right("Price", 7.0, col_price_x, cy, &fonts.bold);
    painter.text_right("Subtotal", 7.0, col_subtotal_x, cy, &fonts.bold);
    cy += 3.0;
    painter.hline(lx, rx, cy, 0.2);
    cy += 3.0;

    for item in &order.cart {
        let quantity = if item.quantity == 0 { 1 } else { item.quantity };
        let subtotal = quantity as f64 * item.price;
        let name_lines = wrap_text(
            item.name.as_deref().unwrap_or("Product"),
            6.5,
            col_qty_x - col_product_x - 2.0,
        );

        let mut line_y = cy;
        for line in &name_lines {
            painter.text(line, 6.5, col_product_x, line_y, &fonts.regular);
            line_y += 3.2;
        }
        painter.text_right(&quantity.to_string(), 6.5, col_qty_x, cy, &fonts.regular);
        painter.text_right(
            &format!("Rs. {}", format_currency(item.price)),
            6.5,
            col_price_x,
            cy,
            &fonts.regular,
        );
        painter.text_right(
            &format!("Rs. {}", format_currency(subtotal)),
            6.5,
            col_subtotal_x,
            cy,
            &fonts.regular,
        );
        cy += name_lines.len() as f64 * 3.2 + 1.0;
    }

    cy += 2.0;
    painter.hline(lx, rx, cy, 0.2);
    cy += 4.0;

    // Totals
    let item_total = order.total_amount;
    painter.text_right("Item Total:", 7.0, col_price_x, cy, &fonts.regular);
    painter.text_right(
        &format!("Rs. {}", format_amount(item_total)),
        7.0,
        col_subtotal_x,
        cy,
        &fonts.regular,
    );
    cy += 3.5;
    painter.text_right("GST (included):", 7.0, col_price_x, cy, &fonts.regular);
    painter.text_right("Included", 7.0, col_subtotal_x, cy, &fonts.regular);
    cy += 4.0;
    painter.hline(lx, rx, cy, 0.3);
    cy += 4.0;
    painter.text_right("Grand Total:", 9.0, col_price_x, cy, &fonts.bold);
    painter.text_right(
        &format!("Rs. {}", format_amount(item_total)),
        9.0,
        col_subtotal_x,
        cy,
        &fonts.bold,
    );
    cy += 5.0;

    // COD collect note
    if matches!(
        order.payment_method.as_deref(),
        Some("COD") | Some("Cash on Delivery")
    ) {
        painter.rect_filled(
            lx,
            cy - 2.0,
            INVOICE_WIDTH - 6.0,
            7.0,
            Color::Rgb(Rgb::new(1.0, 1.0, 0.78, None)),
        );
        painter.text_center(
            &format!("Cash on Delivery - Collect Rs. {}", format_amount(item_total)),
            8.0,
            x + INVOICE_WIDTH / 2.0,
            cy + 3.0,
            &fonts.bold,
        );
    }

    painter.text_center(
        "Thank you for your order!",
        6.0,
        x + INVOICE_WIDTH / 2.0,
        y + INVOICE_HEIGHT - 6.0,
        &fonts.italic,
    );
}

/// Render the invoice document for the given (non-empty) set of orders.
/// Returns the finished PDF bytes.
pub fn render_invoices(orders: &[&Order], date: NaiveDate) -> Result<Vec<u8>> {
    if orders.is_empty() {
        return Err(AdminError::Export(format!(
            "no eligible orders found for {}",
            date
        )));
    }

    let (doc, first_page, first_layer) = PdfDocument::new(
        format!("Invoices {}", date),
        Mm(PAGE_WIDTH as f32),
        Mm(PAGE_HEIGHT as f32),
        "Layer 1",
    );
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AdminError::Export(format!("font load failed: {}", e)))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AdminError::Export(format!("font load failed: {}", e)))?,
        italic: doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(|e| AdminError::Export(format!("font load failed: {}", e)))?,
    };

    let mut layer = doc.get_page(first_page).get_layer(first_layer);

    for (index, order) in orders.iter().enumerate() {
        if index > 0 && index % SLOTS_PER_PAGE == 0 {
            let (page, page_layer) = doc.add_page(Mm(PAGE_WIDTH as f32), Mm(PAGE_HEIGHT as f32), "Layer 1");
            layer = doc.get_page(page).get_layer(page_layer);
        }
        let (x, y) = slot_position(index);
        let painter = Painter {
            layer: &layer,
            fonts: &fonts,
        };
        draw_invoice(&painter, x, y, order);
    }

    doc.save_to_bytes()
        .map_err(|e| AdminError::Export(format!("failed to render PDF: {}", e)))
}
