//! TUI 编辑器演示
//!
//! 使用 crossterm 和 ratatui 构建的终端源码编辑器，演示 `sourceview-core` 的自动缩进、
//! 智能粘贴、注释切换与查找替换。
//!
//! # 用法
//!
//! ```bash
//! cargo run -p sourceview-tui -- <file_path>
//! ```
//!
//! # 配置与日志
//!
//! - `SOURCEVIEW_CONFIG`: JSON 配置文件路径（见 `SourceConfig`）
//! - `SOURCEVIEW_LOG`: 日志文件路径（默认写入临时目录下的 `sourceview-tui.log`）
//! - `RUST_LOG`: 日志过滤（默认 `info`）
//!
//! ```bash
//! RUST_LOG=sourceview_core=debug cargo run -p sourceview-tui -- main.c
//! ```
//!
//! # 快捷键
//!
//! - 方向键: 移动光标
//! - Shift+方向键: 选择文本
//! - Ctrl+Up/Down: 按段落移动
//! - Home/End: 智能行首/行尾
//! - Tab/Shift+Tab: 缩进/反缩进
//! - Ctrl+S: 保存文件
//! - Ctrl+X: 退出
//! - Ctrl+C / Ctrl+V: 复制 / 粘贴（智能缩进）
//! - Ctrl+Z / Ctrl+Y: 撤销 / 重做
//! - Ctrl+K: 切换行注释
//! - Ctrl+G: 重新缩进整个文件
//! - Ctrl+W: 选中光标处单词
//! - Ctrl+F: 查找（Up/Down 浏览历史）
//! - F3 / Shift+F3: 查找下一个 / 上一个
//! - Ctrl+H: 替换（两步输入：Find / Replace）
//! - Ctrl+R: 替换当前
//! - Ctrl+A: 全部替换
//! - Alt+C / Alt+R: 切换大小写/正则

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use sourceview_core::{
    BracketPair, CommentToggle, ContextKind, ContextSpans, HistoryStore, InputEntry, Key,
    LanguageConfig, Modifiers, PasteMode, SourceConfig, SourceSession, guess_language_id,
};
use sourceview_highlight_simple::RegexContextClassifier;
use std::{
    env, fs,
    io::{self, stdout},
    path::PathBuf,
    process,
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing_subscriber::EnvFilter;

/// 日志文件路径的环境变量
const LOG_ENV_VAR: &str = "SOURCEVIEW_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    Find,
    ReplaceFind,
    ReplaceWith,
}

/// 应用状态
struct App {
    /// 编辑会话
    session: SourceSession,
    /// 文件路径
    file_path: PathBuf,
    /// 上次保存时的缓冲区版本
    saved_revision: u64,
    /// 是否需要退出
    should_quit: bool,
    /// 确认退出模式（如果有未保存修改）
    confirm_quit: bool,
    /// 状态消息
    status_message: String,
    /// 剪贴板
    clipboard: String,
    /// 查找输入框（带历史）
    find_entry: InputEntry,
    /// 替换输入框（带历史）
    replace_entry: InputEntry,
    /// 查找区分大小写
    case_sensitive: bool,
    /// 查找使用正则
    regex: bool,
    /// 当前输入模式（Normal/Find/Replace）
    input_mode: InputMode,
    /// 空闲时计算出的括号配对
    bracket_pair: Option<BracketPair>,
    /// 上次轮询时的 (光标, 版本)
    idle_state: Option<(usize, u64)>,
    /// 视口首行
    scroll_top: usize,
    /// 视口高度（行）
    viewport_height: usize,
}

impl App {
    /// 创建新的应用实例
    fn new(file_path: PathBuf) -> io::Result<Self> {
        let mut status_message = String::new();
        let config = SourceConfig::from_env().unwrap_or_else(|err| {
            tracing::warn!(%err, "failed to load config, using defaults");
            status_message = format!("配置加载失败: {err}");
            SourceConfig::default()
        });

        let session = if file_path.exists() {
            SourceSession::open(&file_path, config).map_err(io::Error::other)?
        } else {
            let language = LanguageConfig::from_id(guess_language_id(&file_path));
            SourceSession::new("", language, config)
        };
        let session = match RegexContextClassifier::for_language(session.language()) {
            Ok(classifier) => session.with_classifier(classifier),
            Err(err) => {
                tracing::warn!(%err, "comment/string classifier unavailable");
                session
            }
        };
        tracing::info!(path = %file_path.display(), language = ?session.language().id(), "opened file");

        let history = HistoryStore::shared();
        let saved_revision = session.buffer().revision();
        Ok(Self {
            session,
            file_path,
            saved_revision,
            should_quit: false,
            confirm_quit: false,
            status_message,
            clipboard: String::new(),
            find_entry: InputEntry::new("Find", "", history.clone()),
            replace_entry: InputEntry::new("Replace", "", history),
            case_sensitive: false,
            regex: false,
            input_mode: InputMode::Normal,
            bracket_pair: None,
            idle_state: None,
            scroll_top: 0,
            viewport_height: 0,
        })
    }

    fn is_modified(&self) -> bool {
        self.session.buffer().revision() != self.saved_revision
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        // 确认退出模式
        if self.confirm_quit {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    if let Err(e) = self.save_file() {
                        self.status_message = format!("保存失败: {}", e);
                        self.confirm_quit = false;
                    } else {
                        self.should_quit = true;
                    }
                }
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.should_quit = true;
                }
                KeyCode::Esc => {
                    self.confirm_quit = false;
                    self.status_message.clear();
                }
                _ => {}
            }
            return;
        }

        if self.input_mode != InputMode::Normal {
            self.handle_prompt_key(key);
            self.adjust_scroll();
            return;
        }

        match (key.modifiers, key.code) {
            // Ctrl+S: 保存
            (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
                if let Err(e) = self.save_file() {
                    self.status_message = format!("保存失败: {}", e);
                } else {
                    self.status_message = format!("已保存: {}", self.file_path.display());
                }
            }

            // Ctrl+X: 退出
            (KeyModifiers::CONTROL, KeyCode::Char('x')) => {
                if self.is_modified() {
                    self.confirm_quit = true;
                    self.status_message = "文件已修改。保存吗? (y/n)".to_string();
                } else {
                    self.should_quit = true;
                }
            }

            (KeyModifiers::CONTROL, KeyCode::Char('c')) => self.copy_selection(),
            (KeyModifiers::CONTROL, KeyCode::Char('v')) => {
                let text = self.clipboard.clone();
                self.handle_paste(text);
            }
            (KeyModifiers::CONTROL, KeyCode::Char('z')) => {
                if !self.session.buffer_mut().undo() {
                    self.status_message = "没有可撤销的操作".to_string();
                }
            }
            (KeyModifiers::CONTROL, KeyCode::Char('y')) => {
                if !self.session.buffer_mut().redo() {
                    self.status_message = "没有可重做的操作".to_string();
                }
            }
            (KeyModifiers::CONTROL, KeyCode::Char('k')) => {
                self.status_message = match self.session.toggle_comments() {
                    CommentToggle::Commented(n) => format!("已注释 {n} 行"),
                    CommentToggle::Uncommented(n) => format!("已取消注释 {n} 行"),
                    CommentToggle::Unchanged => "未改变".to_string(),
                };
            }
            (KeyModifiers::CONTROL, KeyCode::Char('g')) => {
                let changed = self.session.reindent_buffer();
                self.status_message = format!("重新缩进: {changed} 行");
            }
            (KeyModifiers::CONTROL, KeyCode::Char('w')) => self.session.select_word_at_cursor(),
            (KeyModifiers::CONTROL, KeyCode::Char('f')) => self.start_prompt(InputMode::Find),
            (KeyModifiers::CONTROL, KeyCode::Char('h')) => {
                self.start_prompt(InputMode::ReplaceFind)
            }
            (KeyModifiers::CONTROL, KeyCode::Char('r')) => self.replace_current(),
            (KeyModifiers::CONTROL, KeyCode::Char('a')) => self.replace_all(),
            (KeyModifiers::NONE, KeyCode::F(3)) => self.find(true),
            (KeyModifiers::SHIFT, KeyCode::F(3)) => self.find(false),

            _ => {
                if let Some((key, mods)) = session_key(&key) {
                    self.status_message.clear();
                    self.session.press_key(key, mods);
                }
            }
        }

        self.adjust_scroll();
    }

    fn search_options_label(&self) -> String {
        let case = if self.case_sensitive { "Aa" } else { "aa" };
        let regex = if self.regex { "R" } else { "-" };
        format!("{} {}", case, regex)
    }

    fn start_prompt(&mut self, mode: InputMode) {
        self.input_mode = mode;
        self.status_message.clear();
    }

    fn active_entry(&mut self) -> &mut InputEntry {
        match self.input_mode {
            InputMode::ReplaceWith => &mut self.replace_entry,
            _ => &mut self.find_entry,
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc) => {
                self.input_mode = InputMode::Normal;
                self.status_message.clear();
            }
            (_, KeyCode::Enter) => match self.input_mode {
                InputMode::Find => {
                    self.find_entry.activate();
                    self.input_mode = InputMode::Normal;
                    if self.apply_search() {
                        self.find(true);
                    }
                }
                InputMode::ReplaceFind => {
                    self.find_entry.activate();
                    self.input_mode = InputMode::ReplaceWith;
                }
                InputMode::ReplaceWith => {
                    let replacement = self.replace_entry.activate();
                    self.input_mode = InputMode::Normal;
                    if self.apply_search() {
                        self.status_message =
                            format!("替换就绪: {} -> {}", self.find_entry.text(), replacement);
                    }
                }
                InputMode::Normal => {}
            },
            (_, KeyCode::Up) => {
                self.active_entry().history_up();
            }
            (_, KeyCode::Down) => {
                self.active_entry().history_down();
            }
            (_, KeyCode::Backspace) => {
                self.active_entry().pop_char();
            }
            (mods, KeyCode::Char('c' | 'C')) if mods.contains(KeyModifiers::ALT) => {
                self.case_sensitive = !self.case_sensitive;
                self.status_message = format!("查找选项: {}", self.search_options_label());
            }
            (mods, KeyCode::Char('r' | 'R')) if mods.contains(KeyModifiers::ALT) => {
                self.regex = !self.regex;
                self.status_message = format!("查找选项: {}", self.search_options_label());
            }
            (_, KeyCode::Char(c)) => {
                self.active_entry().push_char(c);
            }
            _ => {}
        }
    }

    /// 用查找框内容更新会话的查找状态
    fn apply_search(&mut self) -> bool {
        let query = self.find_entry.text().to_string();
        match self
            .session
            .search_highlight(&query, self.case_sensitive, self.regex)
        {
            Ok(count) => {
                self.status_message = format!("匹配: {count}");
                count > 0
            }
            Err(err) => {
                self.status_message = format!("查找失败: {err}");
                false
            }
        }
    }

    fn find(&mut self, forward: bool) {
        if self.session.search().is_none() {
            self.status_message = "查找内容为空（Ctrl+F 输入）".to_string();
            return;
        }
        let found = if forward {
            self.session.search_forward()
        } else {
            self.session.search_backward()
        };
        self.status_message = match found {
            Some(m) => format!("找到: {}..{}", m.start, m.end),
            None => "未找到".to_string(),
        };
    }

    fn replace_current(&mut self) {
        let replacement = self.replace_entry.text().to_string();
        self.status_message = match self.session.replace_forward(&replacement) {
            Some(m) => format!("已替换: {}..{}", m.start, m.end),
            None => "未找到".to_string(),
        };
    }

    fn replace_all(&mut self) {
        let replacement = self.replace_entry.text().to_string();
        let count = self.session.replace_all(&replacement);
        self.status_message = format!("全部替换: {count} 处");
    }

    fn copy_selection(&mut self) {
        let (start, end) = self.session.buffer().selection_bounds();
        if start == end {
            self.status_message = "没有选中文本".to_string();
            return;
        }
        self.clipboard = self.session.buffer().slice(start, end);
        self.status_message = format!("已复制 {} 个字符", end - start);
    }

    fn handle_paste(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        if self.session.paste(&text) == PasteMode::Reindented {
            self.status_message = "已按当前缩进粘贴".to_string();
        }
        self.adjust_scroll();
    }

    /// 空闲时刷新括号配对
    fn poll_idle(&mut self) {
        let state = (
            self.session.buffer().cursor(),
            self.session.buffer().revision(),
        );
        if self.idle_state != Some(state) {
            self.idle_state = Some(state);
            self.bracket_pair = None;
        }
        if let Some(pair) = self.session.poll_idle(Instant::now()) {
            self.bracket_pair = Some(pair);
        }
    }

    fn adjust_scroll(&mut self) {
        if self.viewport_height == 0 {
            return;
        }
        let line = self.session.buffer().cursor_position().line;
        if line < self.scroll_top {
            self.scroll_top = line;
        }
        if line >= self.scroll_top + self.viewport_height {
            self.scroll_top = line + 1 - self.viewport_height;
        }
    }

    /// 保存文件
    fn save_file(&mut self) -> io::Result<()> {
        let content = self.session.prepare_for_save();
        fs::write(&self.file_path, content)?;
        self.saved_revision = self.session.buffer().revision();
        tracing::info!(path = %self.file_path.display(), "saved");
        Ok(())
    }

    /// 渲染 UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // 编辑器区域
                Constraint::Length(1), // 状态行
                Constraint::Length(1), // 快捷键提示
            ])
            .split(size);

        let editor_area = chunks[0];
        self.viewport_height = editor_area.height.saturating_sub(2) as usize;
        self.adjust_scroll();

        self.render_editor(frame, editor_area);
        self.render_status_line(frame, chunks[1]);
        self.render_shortcuts(frame, chunks[2]);
    }

    fn render_editor(&mut self, frame: &mut Frame, area: Rect) {
        let context: ContextSpans = self.session.context().clone();
        let buffer = self.session.buffer();
        let (sel_start, sel_end) = buffer.selection_bounds();
        let brackets = self
            .bracket_pair
            .map(|pair| [pair.bracket, pair.partner])
            .unwrap_or([usize::MAX; 2]);

        let inner_width = area.width.saturating_sub(2) as usize;
        let last_line = (self.scroll_top + self.viewport_height).min(buffer.line_count());
        let mut display_lines = Vec::with_capacity(self.viewport_height);
        for line in self.scroll_top..last_line {
            let line_start = buffer.line_start(line);
            let spans: Vec<Span> = buffer
                .line_text(line)
                .chars()
                .take(inner_width)
                .enumerate()
                .map(|(column, ch)| {
                    let offset = line_start + column;
                    let mut style = match context.kind_at(offset) {
                        Some(ContextKind::Comment) => Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::ITALIC),
                        Some(ContextKind::String) => Style::default().fg(Color::Green),
                        None => Style::default(),
                    };
                    if brackets.contains(&offset) {
                        style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
                    }
                    if offset >= sel_start && offset < sel_end {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    let shown = if ch == '\t' { ' ' } else { ch };
                    Span::styled(shown.to_string(), style)
                })
                .collect();
            display_lines.push(Line::from(spans));
        }

        let title = format!(
            " {}{} ",
            self.file_path.display(),
            if self.is_modified() { " *" } else { "" }
        );
        let paragraph =
            Paragraph::new(display_lines).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);

        if self.input_mode == InputMode::Normal {
            let cursor = buffer.cursor_position();
            if cursor.line >= self.scroll_top && cursor.line < last_line.max(self.scroll_top + 1) {
                let x = area.x + 1 + cursor.column.min(inner_width) as u16;
                let y = area.y + 1 + (cursor.line - self.scroll_top) as u16;
                frame.set_cursor_position((x, y));
            }
        }
    }

    fn render_status_line(&self, frame: &mut Frame, area: Rect) {
        let status_text = match self.input_mode {
            InputMode::Find => format!(
                "Find [{}] > {}  (Enter=Next, Up/Down=History, Esc=Cancel, Alt+C/R=Options)",
                self.search_options_label(),
                self.find_entry.text()
            ),
            InputMode::ReplaceFind => format!(
                "Replace: Find [{}] > {}  (Enter=Next, Esc=Cancel, Alt+C/R=Options)",
                self.search_options_label(),
                self.find_entry.text()
            ),
            InputMode::ReplaceWith => format!(
                "Replace: With [{}] > {}  (Enter=Done, Esc=Cancel)",
                self.search_options_label(),
                self.replace_entry.text()
            ),
            InputMode::Normal if !self.status_message.is_empty() => self.status_message.clone(),
            InputMode::Normal => {
                let buffer = self.session.buffer();
                let cursor = buffer.cursor_position();
                format!(
                    "行:{} 列:{} | 缩进:{} | 语言:{} | 总行数:{} 字符数:{} | 版本:{}",
                    cursor.line + 1,
                    cursor.column + 1,
                    self.session.indent_unit(),
                    self.session.language().id().unwrap_or("text"),
                    buffer.line_count(),
                    buffer.len_chars(),
                    buffer.revision()
                )
            }
        };

        let status_line = Paragraph::new(status_text).style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

        frame.render_widget(status_line, area);
    }

    /// 渲染快捷键提示
    fn render_shortcuts(&self, frame: &mut Frame, area: Rect) {
        let shortcuts = if self.confirm_quit {
            "Y:保存并退出  N:不保存退出  Esc:取消"
        } else {
            "Ctrl-S:保存  Ctrl-X:退出  Ctrl-Z/Y:撤销/重做  Ctrl-C/V:复制/粘贴  Ctrl-K:注释  Ctrl-G:重新缩进  Ctrl-F/H:查找/替换  F3:下一个  Shift-F3:上一个  Ctrl-R/A:替换/全部"
        };

        let shortcuts_line =
            Paragraph::new(shortcuts).style(Style::default().bg(Color::Blue).fg(Color::White));

        frame.render_widget(shortcuts_line, area);
    }
}

/// crossterm 按键 -> 会话按键
fn session_key(key: &KeyEvent) -> Option<(Key, Modifiers)> {
    let code = match key.code {
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Char(c) => Key::Char(c),
        _ => return None,
    };

    let mut mods = Modifiers::empty();
    for (from, to) in [
        (KeyModifiers::SHIFT, Modifiers::SHIFT),
        (KeyModifiers::CONTROL, Modifiers::CONTROL),
        (KeyModifiers::ALT, Modifiers::ALT),
        (KeyModifiers::META, Modifiers::META),
    ] {
        if key.modifiers.contains(from) {
            mods |= to;
        }
    }
    Some((code, mods))
}

/// 日志写入文件（终端被 TUI 占用）
fn init_logging() {
    let path = env::var_os(LOG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("sourceview-tui.log"));
    let Ok(file) = fs::File::create(&path) else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("用法: {} <file_path>", args[0]);
        eprintln!("\n示例:");
        eprintln!("  {} main.c", args[0]);
        process::exit(1);
    }

    init_logging();
    let file_path = PathBuf::from(&args[1]);

    // 创建应用（在进入 raw mode 之前，便于报告打开错误）
    let mut app = App::new(file_path)?;

    // 设置终端
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // 恢复终端
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(%err, "editor loop failed");
        eprintln!("错误: {}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    app.handle_key_event(key);
                }
                Event::Paste(text) => {
                    app.handle_paste(text);
                }
                _ => {}
            }
        }

        app.poll_idle();
    }

    Ok(())
}
