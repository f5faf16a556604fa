//! Starter documents by document class.

/// Document classes clients may request a template for, in the order they
/// are advertised.
pub const DOCUMENT_CLASSES: &[&str] = &[
    "article", "report", "book", "letter", "beamer", "memoir", "scrartcl", "scrreprt", "scrbook",
];

/// Whether `document_class` is in the advertised set.
pub fn is_supported(document_class: &str) -> bool {
    DOCUMENT_CLASSES.contains(&document_class)
}

/// Starter content for `document_class`.
///
/// Only `article`, `report`, and `beamer` carry dedicated bodies; every
/// other class (and any unknown template name used when creating files)
/// falls back to the article body.
pub fn template_for(document_class: &str) -> &'static str {
    match document_class {
        "report" => REPORT,
        "beamer" => BEAMER,
        _ => ARTICLE,
    }
}

const ARTICLE: &str = r"\documentclass[11pt,a4paper]{article}

\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}
\usepackage{lmodern}
\usepackage[english]{babel}
\usepackage{amsmath,amssymb,amsthm}
\usepackage{graphicx}
\usepackage{hyperref}

\title{Your Title Here}
\author{Your Name}
\date{\today}

\begin{document}

\maketitle

\begin{abstract}
Your abstract here.
\end{abstract}

\section{Introduction}

Your content here.

\section{Conclusion}

Your conclusion here.

\end{document}";

const REPORT: &str = r"\documentclass[11pt,a4paper]{report}

\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}
\usepackage{lmodern}
\usepackage[english]{babel}
\usepackage{amsmath,amssymb,amsthm}
\usepackage{graphicx}
\usepackage{hyperref}

\title{Your Report Title}
\author{Your Name}
\date{\today}

\begin{document}

\maketitle
\tableofcontents

\chapter{Introduction}

Your introduction here.

\chapter{Main Content}

Your main content here.

\chapter{Conclusion}

Your conclusion here.

\end{document}";

const BEAMER: &str = r"\documentclass{beamer}

\usetheme{Madrid}
\usecolortheme{default}

\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}
\usepackage{lmodern}
\usepackage[english]{babel}
\usepackage{amsmath,amssymb}

\title{Your Presentation Title}
\author{Your Name}
\institute{Your Institution}
\date{\today}

\begin{document}

\frame{\titlepage}

\begin{frame}
\frametitle{Table of Contents}
\tableofcontents
\end{frame}

\section{Introduction}
\begin{frame}
\frametitle{Introduction}
\begin{itemize}
\item Your first point
\item Your second point
\item Your third point
\end{itemize}
\end{frame}

\section{Conclusion}
\begin{frame}
\frametitle{Conclusion}
Your conclusion here.
\end{frame}

\end{document}";
