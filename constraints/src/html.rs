/// HTML rendering of a compiled system.
///
/// Read-only pretty-printer for inspecting circuits in a browser: one line
/// per constraint, one `<span>` per term, CSS class keyed by the wire's
/// visibility. Hint-driven wires get their own class. Not on the solver's
/// hot path.

use std::io::{self, Write};

use crate::r1cs::R1cs;
use crate::term::{
    Term, Visibility, COEFF_ID_MINUS_ONE, COEFF_ID_ONE, COEFF_ID_ZERO,
};

const STYLE: &str = "\
.internal { color: #2b6cb0; }
.hint { color: #805ad5; }
.public { color: #2f855a; }
.secret { color: #c53030; }
.virtual { color: #975a16; }
.unset { color: #718096; }
.coefficient { color: #4a5568; }
";

impl R1cs {
    /// Render the whole system as an HTML document.
    pub fn to_html<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "<!DOCTYPE html>")?;
        writeln!(w, "<html><head><meta charset=\"utf-8\"><style>{STYLE}</style></head><body>")?;
        writeln!(
            w,
            "<p>{} constraints ({} computational), {} wires, {} coefficients, curve {}</p>",
            self.nb_constraints,
            self.nb_co_constraints,
            self.nb_wires(),
            self.nb_coefficients(),
            self.curve_id(),
        )?;
        writeln!(w, "<ol start=\"0\">")?;
        for c in &self.constraints {
            write!(w, "<li>(")?;
            self.expression_to_html(w, &c.l)?;
            write!(w, ") &times; (")?;
            self.expression_to_html(w, &c.r)?;
            write!(w, ") = ")?;
            self.expression_to_html(w, &c.o)?;
            writeln!(w, "</li>")?;
        }
        writeln!(w, "</ol>")?;
        writeln!(w, "</body></html>")
    }

    fn expression_to_html<W: Write>(&self, w: &mut W, lin: &[Term]) -> io::Result<()> {
        if lin.is_empty() {
            return write!(w, "0");
        }
        for (i, &t) in lin.iter().enumerate() {
            if i > 0 {
                write!(w, " + ")?;
            }
            self.term_to_html(w, t)?;
        }
        Ok(())
    }

    fn term_to_html<W: Write>(&self, w: &mut W, t: Term) -> io::Result<()> {
        match t.coeff_id() {
            COEFF_ID_ONE => {}
            COEFF_ID_MINUS_ONE => write!(w, "<span class=\"coefficient\">-</span>")?,
            COEFF_ID_ZERO => return write!(w, "<span class=\"coefficient\">0</span>"),
            cid => write!(
                w,
                "<span class=\"coefficient\">{}</span>*",
                self.coefficients[cid]
            )?,
        }

        let wire = t.wire_id();
        let class = match t.visibility() {
            Visibility::Internal => {
                if self.hint_for_wire(wire).is_some() {
                    "hint"
                } else {
                    "internal"
                }
            }
            Visibility::Public => "public",
            Visibility::Secret => "secret",
            Visibility::Virtual => "virtual",
            Visibility::Unset => "unset",
        };
        write!(w, "<span class=\"{class}\">v{wire}</span>")
    }
}
