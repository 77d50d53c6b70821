//   Copyright (c) 2024-2026 Anton Kundenko <singaraiona@gmail.com>
//   All rights reserved.
//
//   Permission is hereby granted, free of charge, to any person obtaining a copy
//   of this software and associated documentation files (the "Software"), to deal
//   in the Software without restriction, including without limitation the rights
//   to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
//   copies of the Software, and to permit persons to whom the Software is
//   furnished to do so, subject to the following conditions:
//
//   The above copyright notice and this permission notice shall be included in all
//   copies or substantial portions of the Software.
//
//   THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
//   IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
//   FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
//   AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
//   LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
//   OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
//   SOFTWARE.

// ANSI palette used for plan output, so colors follow the terminal profile.

pub const BOLD: &str = "\x1b[1m";
pub const R: &str = "\x1b[0m";

// Plan trees
pub const NODE: &str = "\x1b[1;36m"; // bold cyan, "[kQuery]" tags
pub const DETAIL: &str = "\x1b[39m"; // default foreground
pub const BRANCH: &str = "\x1b[90m"; // gray, "+-" connectors

// Status
pub const ERROR: &str = "\x1b[1;31m";
pub const SUCCESS: &str = "\x1b[32m";

// Banner and help
pub const BAN_BORDER: &str = "\x1b[34m";
pub const BAN_TITLE: &str = "\x1b[1;36m";
pub const DIM: &str = "\x1b[90m";
pub const DOT_CMD: &str = "\x1b[36m";
